//! Loan read models.
//!
//! # Responsibility
//! - Provide loan lookups, the active-loan list, a member's borrowing
//!   history and the overdue report.
//!
//! # Invariants
//! - This repository never writes. Loan creation, return and deletion go
//!   through `LibraryService` so the availability flag stays in sync.

use crate::db::Database;
use crate::model::loan::{Loan, MemberLoan, OverdueLoan};
use crate::model::RowId;
use crate::repo::{date_value, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Row};

pub(crate) const LOAN_SELECT_SQL: &str = "SELECT
    id,
    book_id,
    member_id,
    loan_date,
    due_date,
    return_date
FROM loans";

/// Repository interface for loan queries.
pub trait LoanRepository {
    fn get_by_id(&self, id: RowId) -> RepoResult<Option<Loan>>;
    /// Loans without a return date, soonest due first.
    fn get_active(&self) -> RepoResult<Vec<Loan>>;
    /// A member's loans joined with book details, newest first.
    fn get_by_member(&self, member_id: RowId, active_only: bool) -> RepoResult<Vec<MemberLoan>>;
    /// Active loans due before `today`, oldest due date first.
    fn get_overdue(&self, today: NaiveDate) -> RepoResult<Vec<OverdueLoan>>;
}

/// SQLite-backed loan repository.
pub struct SqliteLoanRepository<'db> {
    db: &'db Database,
}

impl<'db> SqliteLoanRepository<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self { db }
    }
}

impl LoanRepository for SqliteLoanRepository<'_> {
    fn get_by_id(&self, id: RowId) -> RepoResult<Option<Loan>> {
        Ok(self.db.query_optional(
            &format!("{LOAN_SELECT_SQL} WHERE id = ?1;"),
            [id],
            loan_from_row,
        )?)
    }

    fn get_active(&self) -> RepoResult<Vec<Loan>> {
        Ok(self.db.query_map(
            &format!("{LOAN_SELECT_SQL} WHERE return_date IS NULL ORDER BY due_date ASC, id ASC;"),
            [],
            loan_from_row,
        )?)
    }

    fn get_by_member(&self, member_id: RowId, active_only: bool) -> RepoResult<Vec<MemberLoan>> {
        let mut sql = String::from(
            "SELECT
                loans.id,
                loans.book_id,
                loans.member_id,
                loans.loan_date,
                loans.due_date,
                loans.return_date,
                books.title AS book_title,
                books.author AS book_author,
                books.isbn AS book_isbn
             FROM loans
             INNER JOIN books ON loans.book_id = books.id
             WHERE loans.member_id = ?1",
        );
        if active_only {
            sql.push_str(" AND loans.return_date IS NULL");
        }
        sql.push_str(" ORDER BY loans.loan_date DESC, loans.id DESC;");

        Ok(self.db.query_map(&sql, [member_id], |row| {
            Ok(MemberLoan {
                loan: loan_from_row(row)?,
                book_title: row.get("book_title")?,
                book_author: row.get("book_author")?,
                book_isbn: row.get("book_isbn")?,
            })
        })?)
    }

    fn get_overdue(&self, today: NaiveDate) -> RepoResult<Vec<OverdueLoan>> {
        Ok(self.db.query_map(
            "SELECT
                loans.id,
                loans.book_id,
                loans.member_id,
                loans.loan_date,
                loans.due_date,
                loans.return_date,
                books.title AS book_title,
                books.author AS book_author,
                members.name AS member_name,
                members.email AS member_email
             FROM loans
             INNER JOIN books ON loans.book_id = books.id
             INNER JOIN members ON loans.member_id = members.id
             WHERE loans.return_date IS NULL
               AND loans.due_date < ?1
             ORDER BY loans.due_date ASC, loans.id ASC;",
            params![date_value(today)],
            |row| {
                Ok(OverdueLoan {
                    loan: loan_from_row(row)?,
                    book_title: row.get("book_title")?,
                    book_author: row.get("book_author")?,
                    member_name: row.get("member_name")?,
                    member_email: row.get("member_email")?,
                })
            },
        )?)
    }
}

pub(crate) fn loan_from_row(row: &Row<'_>) -> rusqlite::Result<Loan> {
    Ok(Loan {
        id: row.get("id")?,
        book_id: row.get("book_id")?,
        member_id: row.get("member_id")?,
        loan_date: row.get("loan_date")?,
        due_date: row.get("due_date")?,
        return_date: row.get("return_date")?,
    })
}
