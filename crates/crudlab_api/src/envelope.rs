//! JSON response envelope and error-to-status mapping.
//!
//! # Invariants
//! - Exactly one of `data` / `error` is present.
//! - `success` is true iff `status` is 2xx.

use crudlab_core::RepoError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Transport-agnostic response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Conventional HTTP status code.
    pub status: u16,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: Value) -> Self {
        Self::success(STATUS_OK, data)
    }

    pub fn created(data: Value) -> Self {
        Self::success(STATUS_CREATED, data)
    }

    pub fn failure(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Maps a domain error to its status code and message.
    pub fn from_error(err: &RepoError) -> Self {
        Self::failure(status_for(err), err.to_string())
    }

    /// Serialized envelope; falls back to a fixed 500 body if encoding fails.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"status":{STATUS_INTERNAL_ERROR},"success":false,"error":"response encoding failed"}}"#
            )
        })
    }

    fn success(status: u16, data: Value) -> Self {
        Self {
            status,
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

pub fn status_for(err: &RepoError) -> u16 {
    match err {
        RepoError::Validation(_) => STATUS_BAD_REQUEST,
        RepoError::NotFound { .. } => STATUS_NOT_FOUND,
        RepoError::Duplicate(_) | RepoError::Referential(_) => STATUS_CONFLICT,
        RepoError::Db(_) => STATUS_INTERNAL_ERROR,
    }
}
