//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file-backed SQLite connections from an explicit `DbConfig`.
//! - Configure connection pragmas required by core behavior.
//! - Create, reset and migrate the store before the first service call.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - `Database::open` returns only after migrations are fully applied.

use super::migrations::apply_migrations;
use super::{Database, DbError, DbResult};
use crate::config::{DbConfig, MAX_BUSY_TIMEOUT};
use log::{error, info, warn};
use rusqlite::Connection;
use std::path::Path;
use std::time::Instant;

/// Opens one configured connection for a single logical operation.
///
/// Failures are reported as `DbError::Connection` so callers can tell an
/// unreachable store apart from a rejected statement.
pub fn open_connection(config: &DbConfig) -> DbResult<Connection> {
    let conn = Connection::open(config.path()).map_err(|source| connection_error(config, source))?;
    conn.busy_timeout(config.busy_timeout.min(MAX_BUSY_TIMEOUT))
        .map_err(|source| connection_error(config, source))?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|source| connection_error(config, source))?;
    Ok(conn)
}

impl Database {
    /// Prepares the store described by `config` and applies pending
    /// migrations.
    ///
    /// # Side effects
    /// - Creates the parent directory of the database file when missing.
    /// - Emits `db_open` logging events with duration and status.
    pub fn open(config: DbConfig) -> DbResult<Self> {
        let started_at = Instant::now();
        info!(
            "event=db_open module=db status=start path={}",
            config.path().display()
        );

        match bootstrap(&config) {
            Ok(()) => {
                info!(
                    "event=db_open module=db status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(Self::from_config(config))
            }
            Err(err) => {
                error!(
                    "event=db_open module=db status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Deletes the database file (if any) and recreates the schema.
    pub fn reset(config: DbConfig) -> DbResult<Self> {
        let path = config.path();
        if path.exists() {
            std::fs::remove_file(path).map_err(|source| DbError::Io {
                path: path.display().to_string(),
                source,
            })?;
            warn!(
                "event=db_reset module=db status=ok path={}",
                path.display()
            );
        }
        Self::open(config)
    }
}

fn bootstrap(config: &DbConfig) -> DbResult<()> {
    ensure_parent_dir(config.path())?;
    let mut conn = open_connection(config)?;
    apply_migrations(&mut conn)
}

fn ensure_parent_dir(path: &Path) -> DbResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|source| DbError::Io {
                path: parent.display().to_string(),
                source,
            })
        }
        _ => Ok(()),
    }
}

fn connection_error(config: &DbConfig, source: rusqlite::Error) -> DbError {
    DbError::Connection {
        path: config.path().display().to_string(),
        source,
    }
}
