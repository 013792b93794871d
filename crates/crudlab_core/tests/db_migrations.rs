mod common;

use crudlab_core::db::migrations::{current_user_version, latest_version};
use crudlab_core::db::open_connection;
use crudlab_core::{Database, DbConfig, DbError};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::time::Duration;

#[test]
fn open_applies_all_migrations() {
    let (_dir, db) = common::open_temp_db();

    let conn = db.connect().unwrap();
    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    assert_eq!(latest_version(), 3);

    let tables = db.table_names().unwrap();
    for expected in [
        "books",
        "categories",
        "loans",
        "members",
        "product_categories",
        "products",
        "suppliers",
        "task_categories",
        "tasks",
    ] {
        assert!(
            tables.iter().any(|name| name == expected),
            "table {expected} does not exist"
        );
    }
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path().join("crudlab.db"));

    let first = Database::open(config.clone()).unwrap();
    first
        .insert(
            "INSERT INTO books (title, author, isbn) VALUES (?1, ?2, ?3);",
            ["Dune", "Frank Herbert", "9780441172719"],
        )
        .unwrap();
    drop(first);

    let second = Database::open(config).unwrap();
    let rows = second.query("SELECT title FROM books;", []).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("title"), Some(&Value::Text("Dune".to_string())));
}

#[test]
fn open_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("data").join("crudlab.db");

    Database::open(DbConfig::new(&path)).unwrap();
    assert!(path.exists());
}

#[test]
fn oversized_busy_timeout_opens_instead_of_panicking() {
    let dir = tempfile::tempdir().unwrap();
    let clamped =
        DbConfig::new(dir.path().join("clamped.db")).with_busy_timeout(Duration::from_secs(3_000_000));
    let db = Database::open(clamped).unwrap();
    assert!(!db.table_names().unwrap().is_empty());

    let mut raw = DbConfig::new(dir.path().join("raw.db"));
    raw.busy_timeout = Duration::from_secs(u64::MAX / 2);
    let db = Database::open(raw).unwrap();
    db.connect().unwrap();
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = Database::open(DbConfig::new(&path)).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn reset_discards_existing_rows() {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path().join("crudlab.db"));

    let db = Database::open(config.clone()).unwrap();
    db.insert(
        "INSERT INTO members (name, email) VALUES (?1, ?2);",
        ["Ada", "ada@example.com"],
    )
    .unwrap();

    let db = Database::reset(config).unwrap();
    assert!(db.query("SELECT id FROM members;", []).unwrap().is_empty());
}

#[test]
fn connections_enforce_foreign_keys() {
    let (_dir, db) = common::open_temp_db();

    let conn = open_connection(db.config()).unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    let err = db
        .insert(
            "INSERT INTO loans (book_id, member_id, loan_date, due_date)
             VALUES (41, 42, '2026-01-01', '2026-01-15');",
            [],
        )
        .unwrap_err();
    assert_eq!(err.constraint(), Some(crudlab_core::ConstraintKind::ForeignKey));
}

#[test]
fn unreachable_store_is_a_connection_fault() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-directory");
    std::fs::write(&blocker, b"plain file").unwrap();

    let err = open_connection(&DbConfig::new(blocker.join("crudlab.db"))).unwrap_err();
    assert!(matches!(err, DbError::Connection { .. }));
    assert_eq!(err.constraint(), None);

    let err = Database::open(DbConfig::new(blocker.join("crudlab.db"))).unwrap_err();
    assert!(matches!(err, DbError::Io { .. }));
}

#[test]
fn query_returns_ordered_records() {
    let (_dir, db) = common::open_temp_db();
    db.insert(
        "INSERT INTO task_categories (name) VALUES (?1);",
        ["Errands"],
    )
    .unwrap();

    let rows = db
        .query("SELECT id, name FROM task_categories;", [])
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].columns(), ["id".to_string(), "name".to_string()]);
    let pairs: Vec<&str> = rows[0].iter().map(|(column, _)| column).collect();
    assert_eq!(pairs, vec!["id", "name"]);
    assert_eq!(rows[0].get("missing"), None);
}
