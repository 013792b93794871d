//! Library member records.

use super::{empty_patch_error, RowId};
use crate::validation::{self, ValidationError, ValidationResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: RowId,
    pub name: String,
    /// Unique across members.
    pub email: String,
    pub join_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewMember {
    pub name: String,
    pub email: String,
}

impl NewMember {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn validate(&self) -> ValidationResult {
        validation::not_empty(&self.name, "Name")?;
        validation::email(&self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl MemberPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }

    pub fn validate(&self) -> ValidationResult {
        if self.is_empty() {
            return Err(empty_patch_error());
        }
        if let Some(name) = &self.name {
            validation::not_empty(name, "Name")?;
        }
        if let Some(email) = &self.email {
            validation::email(email)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberSort {
    #[default]
    Name,
    Email,
    JoinDate,
}

impl MemberSort {
    pub const ALL: [&'static str; 3] = ["name", "email", "join_date"];

    pub fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::JoinDate => "join_date",
        }
    }
}

impl FromStr for MemberSort {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "join_date" => Ok(Self::JoinDate),
            other => Err(ValidationError::new(
                "Sort field",
                format!(
                    "Invalid sort field '{other}'. Must be one of: {}",
                    Self::ALL.join(", ")
                ),
            )),
        }
    }
}
