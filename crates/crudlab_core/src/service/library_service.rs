//! Library circulation use cases.
//!
//! # Responsibility
//! - Borrow and return books while keeping `books.available` in sync with
//!   the loan table.
//!
//! # Invariants
//! - Every check and both writes of one borrow/return/delete run inside a
//!   single `IMMEDIATE` transaction; a failure leaves no partial state.
//! - `available == false` iff the book has exactly one active loan.
//! - The partial unique index `idx_loans_active_book` rejects a second
//!   active loan even if a caller bypasses this service.

use crate::db::{statement_error, ConstraintKind, Database};
use crate::model::book::Book;
use crate::model::loan::Loan;
use crate::model::RowId;
use crate::repo::book_repo::{book_from_row, BOOK_SELECT_SQL};
use crate::repo::loan_repo::{loan_from_row, LOAN_SELECT_SQL};
use crate::repo::{map_write_error, today, RepoError, RepoResult};
use chrono::{Days, NaiveDate};
use log::info;
use rusqlite::{params, OptionalExtension, Transaction};

/// Loan period applied when the caller does not pick one.
pub const DEFAULT_LOAN_DAYS: i64 = 14;

/// Circulation service over a migrated store.
pub struct LibraryService<'db> {
    db: &'db Database,
}

impl<'db> LibraryService<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self { db }
    }

    /// Lends `book_id` to `member_id` starting today.
    pub fn borrow_book(&self, book_id: RowId, member_id: RowId, loan_days: i64) -> RepoResult<RowId> {
        self.borrow_book_on(book_id, member_id, loan_days, today())
    }

    /// Lends `book_id` to `member_id` starting on `loan_date`.
    ///
    /// # Errors
    /// - `Validation` when `loan_days < 1` or the book is checked out.
    /// - `NotFound` when the book or the member does not exist.
    pub fn borrow_book_on(
        &self,
        book_id: RowId,
        member_id: RowId,
        loan_days: i64,
        loan_date: NaiveDate,
    ) -> RepoResult<RowId> {
        if loan_days < 1 {
            return Err(RepoError::validation(
                "Loan period",
                "Loan period must be at least 1 day",
            ));
        }
        let due_date = u64::try_from(loan_days)
            .ok()
            .and_then(|days| loan_date.checked_add_days(Days::new(days)))
            .ok_or_else(|| RepoError::validation("Loan period", "Loan period is too long"))?;

        self.db.transaction(|tx| {
            let book = find_book(tx, book_id)?.ok_or(RepoError::NotFound {
                entity: "Book",
                id: book_id,
            })?;
            if !book.available {
                return Err(book_unavailable(&book));
            }

            let member_exists: Option<i64> = tx
                .query_row("SELECT 1 FROM members WHERE id = ?1;", [member_id], |row| {
                    row.get(0)
                })
                .optional()?;
            if member_exists.is_none() {
                return Err(RepoError::NotFound {
                    entity: "Member",
                    id: member_id,
                });
            }

            tx.execute(
                "INSERT INTO loans (book_id, member_id, loan_date, due_date)
                 VALUES (?1, ?2, ?3, ?4);",
                params![book_id, member_id, loan_date, due_date],
            )
            .map_err(|err| {
                let err = statement_error(err);
                match err.constraint() {
                    Some(ConstraintKind::Unique) => book_unavailable(&book),
                    _ => map_write_error(
                        err,
                        || "Loan already exists".to_string(),
                        || "Invalid reference while creating loan".to_string(),
                    ),
                }
            })?;
            let loan_id = tx.last_insert_rowid();

            tx.execute("UPDATE books SET available = 0 WHERE id = ?1;", [book_id])?;

            info!(
                "event=loan_borrow module=library status=ok loan_id={loan_id} book_id={book_id} member_id={member_id} due_date={due_date}"
            );
            Ok(loan_id)
        })
    }

    /// Closes `loan_id` with today's date.
    pub fn return_book(&self, loan_id: RowId) -> RepoResult<bool> {
        self.return_book_on(loan_id, today())
    }

    /// Closes `loan_id` with `return_date` and makes the book available.
    ///
    /// Returns `Ok(false)` when the loan does not exist.
    pub fn return_book_on(&self, loan_id: RowId, return_date: NaiveDate) -> RepoResult<bool> {
        self.db.transaction(|tx| {
            let Some(loan) = find_loan(tx, loan_id)? else {
                return Ok(false);
            };
            if let Some(returned_on) = loan.return_date {
                return Err(RepoError::validation(
                    "Loan",
                    format!("This book was already returned on {returned_on}"),
                ));
            }
            if return_date < loan.loan_date {
                return Err(RepoError::validation(
                    "Return date",
                    format!(
                        "Return date cannot be before the loan date ({})",
                        loan.loan_date
                    ),
                ));
            }

            tx.execute(
                "UPDATE loans SET return_date = ?1 WHERE id = ?2;",
                params![return_date, loan_id],
            )?;
            tx.execute(
                "UPDATE books SET available = 1 WHERE id = ?1;",
                [loan.book_id],
            )?;

            info!(
                "event=loan_return module=library status=ok loan_id={loan_id} book_id={}",
                loan.book_id
            );
            Ok(true)
        })
    }

    /// Deletes a loan record. Deleting an active loan frees the book.
    pub fn delete_loan(&self, loan_id: RowId) -> RepoResult<bool> {
        self.db.transaction(|tx| {
            let Some(loan) = find_loan(tx, loan_id)? else {
                return Ok(false);
            };

            tx.execute("DELETE FROM loans WHERE id = ?1;", [loan_id])?;
            if loan.is_active() {
                tx.execute(
                    "UPDATE books SET available = 1 WHERE id = ?1;",
                    [loan.book_id],
                )?;
            }

            info!(
                "event=loan_delete module=library status=ok loan_id={loan_id} was_active={}",
                loan.is_active()
            );
            Ok(true)
        })
    }
}

fn find_book(tx: &Transaction<'_>, book_id: RowId) -> rusqlite::Result<Option<Book>> {
    tx.query_row(
        &format!("{BOOK_SELECT_SQL} WHERE id = ?1;"),
        [book_id],
        book_from_row,
    )
    .optional()
}

fn find_loan(tx: &Transaction<'_>, loan_id: RowId) -> rusqlite::Result<Option<Loan>> {
    tx.query_row(
        &format!("{LOAN_SELECT_SQL} WHERE id = ?1;"),
        [loan_id],
        loan_from_row,
    )
    .optional()
}

fn book_unavailable(book: &Book) -> RepoError {
    RepoError::validation(
        "Book",
        format!(
            "Book '{}' is not available. It is currently checked out.",
            book.title
        ),
    )
}
