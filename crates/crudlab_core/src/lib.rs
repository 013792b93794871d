//! Core domain logic for crudlab: a SQLite-backed library, todo list and
//! inventory.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod sample_data;
pub mod service;
pub mod validation;

pub use config::{ConfigError, DbConfig, LogConfig};
pub use db::{ConstraintKind, Database, DbError, DbResult, Record};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::RowId;
pub use repo::{today, RepoError, RepoResult};
pub use sample_data::{seed, SeedSummary};
pub use service::library_service::{LibraryService, DEFAULT_LOAN_DAYS};
pub use validation::ValidationError;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
