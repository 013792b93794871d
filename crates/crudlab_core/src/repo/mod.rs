//! Entity services: validated CRUD over the access layer.
//!
//! # Responsibility
//! - Define one repository contract per table family.
//! - Translate store constraint faults into domain error kinds.
//!
//! # Invariants
//! - Write paths validate input before any SQL runs.
//! - Absence is `Ok(None)` for lookups and `Ok(false)` for update/delete;
//!   it is never an error.
//! - Ordering of every list query is deterministic (`id` breaks ties).

pub mod book_repo;
pub mod category_repo;
pub mod loan_repo;
pub mod member_repo;
pub mod product_repo;
pub mod supplier_repo;
pub mod task_repo;

use crate::db::{statement_error, ConstraintKind, DbError};
use crate::model::RowId;
use crate::validation::ValidationError;
use chrono::{Datelike, Local, NaiveDate};
use rusqlite::types::{Type, Value};
use rusqlite::Row;
use std::str::FromStr;
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

/// Domain error kinds surfaced by entity services.
#[derive(Debug, Error)]
pub enum RepoError {
    /// Bad caller input, detected before any store access.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Unique-constraint violation.
    #[error("{0}")]
    Duplicate(String),
    /// A referenced record is absent where presence is required.
    #[error("{entity} with ID {id} does not exist")]
    NotFound { entity: &'static str, id: RowId },
    /// Foreign-key violation, e.g. deleting a row that is still referenced.
    #[error("{0}")]
    Referential(String),
    /// Connection or statement fault from the store.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(statement_error(value))
    }
}

impl RepoError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::new(field, message))
    }
}

/// Maps a failed write to `Duplicate`/`Referential` when the store reports
/// the matching constraint; everything else stays a store fault.
pub(crate) fn map_write_error(
    err: DbError,
    duplicate: impl FnOnce() -> String,
    referential: impl FnOnce() -> String,
) -> RepoError {
    match err.constraint() {
        Some(ConstraintKind::Unique) => RepoError::Duplicate(duplicate()),
        Some(ConstraintKind::ForeignKey) => RepoError::Referential(referential()),
        _ => RepoError::Db(err),
    }
}

/// Column assignments for a partial `UPDATE ... SET`.
#[derive(Debug, Default)]
pub(crate) struct Assignments {
    columns: Vec<&'static str>,
    values: Vec<Value>,
}

impl Assignments {
    pub(crate) fn set(&mut self, column: &'static str, value: impl Into<Value>) {
        self.columns.push(column);
        self.values.push(value.into());
    }

    pub(crate) fn set_some<T: Into<Value>>(&mut self, column: &'static str, value: Option<T>) {
        if let Some(value) = value {
            self.set(column, value);
        }
    }

    /// Builds `UPDATE {table} SET ... WHERE id = ?` with binds in order.
    pub(crate) fn into_statement(mut self, table: &str, id: RowId) -> (String, Vec<Value>) {
        let set_clause = self
            .columns
            .iter()
            .map(|column| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        self.values.push(Value::Integer(id));
        (
            format!("UPDATE {table} SET {set_clause} WHERE id = ?;"),
            self.values,
        )
    }
}

/// Reads a text column and parses it into a closed enum.
pub(crate) fn parse_column<T>(row: &Row<'_>, column: &str) -> rusqlite::Result<T>
where
    T: FromStr<Err = ValidationError>,
{
    let index = row.as_ref().column_index(column)?;
    let text: String = row.get(index)?;
    text.parse::<T>()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err)))
}

pub(crate) fn date_value(date: NaiveDate) -> Value {
    Value::Text(date.format("%Y-%m-%d").to_string())
}

/// Escapes `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn like_contains(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Local calendar date used for loan dates and overdue checks.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn current_year() -> i32 {
    Local::now().year()
}
