//! Domain records for the library, todo and inventory exercises.
//!
//! # Responsibility
//! - Define the row shapes returned by entity services.
//! - Define create inputs and closed partial-update patches with their
//!   field-by-field validation.
//!
//! # Invariants
//! - Every persisted record is identified by a store-assigned `RowId`.
//! - Models perform no I/O; validation is pure.

pub mod book;
pub mod inventory;
pub mod loan;
pub mod member;
pub mod task;

use crate::validation::ValidationError;

/// Auto-increment primary key assigned by the store.
pub type RowId = i64;

pub(crate) fn empty_patch_error() -> ValidationError {
    ValidationError::new("Update", "No fields provided to update")
}
