#![allow(dead_code)]

use crudlab_core::{DbConfig, Database};
use tempfile::TempDir;

/// Opens a migrated database in a fresh temp directory.
///
/// Keep the returned `TempDir` alive for as long as the database is used.
pub fn open_temp_db() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(DbConfig::new(dir.path().join("crudlab.db"))).unwrap();
    (dir, db)
}
