//! Statement-level access layer over the configured store.
//!
//! # Responsibility
//! - Run exactly one statement (or one closure inside one transaction) per
//!   call on a freshly opened connection.
//! - Return ordered row mappings, affected-row counts or new row ids.
//!
//! # Invariants
//! - The connection is dropped before the call returns, on success and on
//!   failure alike.
//! - Each failure is logged once here and then propagated unchanged.

use super::{open_connection, ConstraintKind, DbError, DbResult};
use crate::config::DbConfig;
use log::{error, warn};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Params, Row, Transaction, TransactionBehavior};

/// One result row as ordered `(column, value)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Record {
    /// Returns the value stored under `column`, if present.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|name| name == column)
            .map(|index| &self.values[index])
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Handle to a migrated SQLite store.
///
/// Holds configuration only; connections are opened per call.
#[derive(Debug, Clone)]
pub struct Database {
    config: DbConfig,
}

impl Database {
    pub(super) fn from_config(config: DbConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Opens a configured connection owned by the caller.
    pub fn connect(&self) -> DbResult<Connection> {
        open_connection(&self.config).inspect_err(log_failure)
    }

    /// Runs a read statement and returns every row as a `Record`.
    pub fn query<P: Params>(&self, sql: &str, params: P) -> DbResult<Vec<Record>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let columns: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            let mut rows = stmt.query(params)?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                let mut values = Vec::with_capacity(columns.len());
                for index in 0..columns.len() {
                    values.push(row.get::<_, Value>(index)?);
                }
                records.push(Record {
                    columns: columns.clone(),
                    values,
                });
            }
            Ok(records)
        })
    }

    /// Runs a read statement and maps each row with `map`.
    pub fn query_map<T, P, F>(&self, sql: &str, params: P, mut map: F) -> DbResult<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let mut rows = stmt.query(params)?;
            let mut items = Vec::new();
            while let Some(row) = rows.next()? {
                items.push(map(row)?);
            }
            Ok(items)
        })
    }

    /// Runs a single-row read; no matching row is `Ok(None)`.
    pub fn query_optional<T, P, F>(&self, sql: &str, params: P, map: F) -> DbResult<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.with_connection(|conn| conn.query_row(sql, params, map).optional())
    }

    /// Runs an `UPDATE`/`DELETE` (or any write) and returns affected rows.
    pub fn update<P: Params>(&self, sql: &str, params: P) -> DbResult<usize> {
        self.with_connection(|conn| conn.execute(sql, params))
    }

    /// Runs an `INSERT` and returns the new row id.
    pub fn insert<P: Params>(&self, sql: &str, params: P) -> DbResult<i64> {
        self.with_connection(|conn| {
            conn.execute(sql, params)?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Runs `work` inside one `IMMEDIATE` transaction.
    ///
    /// The transaction commits only when `work` returns `Ok`; any error
    /// rolls every write back when the transaction is dropped.
    pub fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<DbError>,
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    {
        let mut conn = self.connect()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(statement_error)?;
        let value = work(&tx)?;
        tx.commit().map_err(statement_error)?;
        Ok(value)
    }

    /// Lists user tables in name order.
    pub fn table_names(&self) -> DbResult<Vec<String>> {
        self.query_map(
            "SELECT name
             FROM sqlite_master
             WHERE type = 'table'
               AND name NOT LIKE 'sqlite_%'
             ORDER BY name;",
            [],
            |row| row.get(0),
        )
    }

    fn with_connection<T, F>(&self, work: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self.connect()?;
        work(&conn).map_err(statement_error)
    }
}

/// Wraps a driver error raised inside a transaction closure.
pub(crate) fn statement_error(err: rusqlite::Error) -> DbError {
    let err = DbError::from(err);
    log_failure(&err);
    err
}

fn log_failure(err: &DbError) {
    match err.constraint() {
        Some(ConstraintKind::Other) | None => {
            error!("event=db_statement module=db status=error error={err}");
        }
        Some(kind) => {
            warn!("event=db_statement module=db status=rejected constraint={kind:?} error={err}");
        }
    }
}
