//! SQLite storage bootstrap, schema migrations and the access layer.
//!
//! # Responsibility
//! - Open and configure one SQLite connection per logical operation.
//! - Apply schema migrations in deterministic order.
//! - Collapse driver failures into two coarse kinds: connection faults and
//!   statement faults.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Every connection handed out has `foreign_keys=ON` and the configured
//!   busy timeout.
//! - No connection outlives the call that opened it.

use rusqlite::ffi;
use rusqlite::ErrorCode;
use thiserror::Error;

mod access;
pub mod migrations;
mod open;

pub use access::{Database, Record};
pub(crate) use access::statement_error;
pub use open::open_connection;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to connect to database at `{path}`: {source}")]
    Connection {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("statement failed: {0}")]
    Statement(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    #[error("failed to prepare database file `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Constraint family reported by the store for a rejected write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    NotNull,
    Check,
    Other,
}

impl DbError {
    /// Returns the violated constraint family for statement faults.
    pub fn constraint(&self) -> Option<ConstraintKind> {
        match self {
            Self::Statement(err) => constraint_kind(err),
            _ => None,
        }
    }
}

/// Classifies a driver error as a constraint violation.
///
/// Extended result codes are authoritative. Builds that only report the
/// primary `SQLITE_CONSTRAINT` code fall back to the message text.
pub fn constraint_kind(err: &rusqlite::Error) -> Option<ConstraintKind> {
    let rusqlite::Error::SqliteFailure(failure, message) = err else {
        return None;
    };
    if failure.code != ErrorCode::ConstraintViolation {
        return None;
    }

    let kind = match failure.extended_code {
        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
            ConstraintKind::Unique
        }
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintKind::ForeignKey,
        ffi::SQLITE_CONSTRAINT_NOTNULL => ConstraintKind::NotNull,
        ffi::SQLITE_CONSTRAINT_CHECK => ConstraintKind::Check,
        _ => classify_constraint_message(message.as_deref().unwrap_or_default()),
    };
    Some(kind)
}

/// Message-based fallback used when no extended code is available.
pub fn classify_constraint_message(message: &str) -> ConstraintKind {
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("unique") {
        ConstraintKind::Unique
    } else if lowered.contains("foreign key") {
        ConstraintKind::ForeignKey
    } else if lowered.contains("not null") {
        ConstraintKind::NotNull
    } else if lowered.contains("check") {
        ConstraintKind::Check
    } else {
        ConstraintKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_constraint_message, constraint_kind, ConstraintKind, DbError};
    use rusqlite::ffi;

    fn failure(extended_code: i32, message: &str) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(
            ffi::Error::new(extended_code),
            Some(message.to_string()),
        )
    }

    #[test]
    fn extended_codes_take_precedence_over_message() {
        let err = failure(
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            "UNIQUE text that should be ignored",
        );
        assert_eq!(constraint_kind(&err), Some(ConstraintKind::ForeignKey));
    }

    #[test]
    fn bare_constraint_code_falls_back_to_message() {
        let err = failure(
            ffi::SQLITE_CONSTRAINT,
            "UNIQUE constraint failed: books.isbn",
        );
        assert_eq!(constraint_kind(&err), Some(ConstraintKind::Unique));

        let err = failure(ffi::SQLITE_CONSTRAINT, "FOREIGN KEY constraint failed");
        assert_eq!(constraint_kind(&err), Some(ConstraintKind::ForeignKey));
    }

    #[test]
    fn non_constraint_errors_are_not_classified() {
        let err = failure(ffi::SQLITE_BUSY, "database is locked");
        assert_eq!(constraint_kind(&err), None);
        assert_eq!(DbError::from(err).constraint(), None);
    }

    #[test]
    fn message_fallback_covers_known_families() {
        assert_eq!(
            classify_constraint_message("NOT NULL constraint failed: tasks.title"),
            ConstraintKind::NotNull
        );
        assert_eq!(
            classify_constraint_message("CHECK constraint failed: stock_quantity >= 0"),
            ConstraintKind::Check
        );
        assert_eq!(
            classify_constraint_message("constraint failed"),
            ConstraintKind::Other
        );
    }
}
