//! Demonstration data for the library tables.
//!
//! # Responsibility
//! - Replace all library rows with a fixed catalogue, member list and
//!   loan history so the CLI has something to show.
//!
//! # Invariants
//! - Every row goes through the same repositories and services as user
//!   input, so seeded data satisfies the same validation rules.
//! - Loan dates are relative to the `today` passed in; seeding twice on the
//!   same day produces the same shape.

use crate::db::Database;
use crate::model::book::NewBook;
use crate::model::member::NewMember;
use crate::repo::book_repo::{BookRepository, SqliteBookRepository};
use crate::repo::member_repo::{MemberRepository, SqliteMemberRepository};
use crate::repo::{today, RepoError, RepoResult};
use crate::service::library_service::LibraryService;
use chrono::{Days, NaiveDate};
use log::info;
use serde::Serialize;
use std::collections::HashMap;

const BOOKS: &[(&str, &str, &str, i32)] = &[
    ("Python Crash Course", "Eric Matthes", "978-1593279288", 2019),
    ("Clean Code", "Robert C. Martin", "978-0132350884", 2008),
    ("The Pragmatic Programmer", "David Thomas", "978-0135957059", 2019),
    ("Introduction to Algorithms", "Thomas H. Cormen", "978-0262033848", 2009),
    ("A Brief History of Time", "Stephen Hawking", "978-0553380163", 1988),
    ("The Selfish Gene", "Richard Dawkins", "978-0198788607", 1976),
    ("Cosmos", "Carl Sagan", "978-0345539434", 1980),
    ("1984", "George Orwell", "978-0451524935", 1949),
    ("To Kill a Mockingbird", "Harper Lee", "978-0061120084", 1960),
    ("The Great Gatsby", "F. Scott Fitzgerald", "978-0743273565", 1925),
    ("Pride and Prejudice", "Jane Austen", "978-0141439518", 1813),
    ("Sapiens", "Yuval Noah Harari", "978-0062316097", 2015),
    ("Educated", "Tara Westover", "978-0399590504", 2018),
    ("Thinking, Fast and Slow", "Daniel Kahneman", "978-0374533557", 2011),
    ("Atomic Habits", "James Clear", "978-0735211292", 2018),
    ("The 7 Habits of Highly Effective People", "Stephen Covey", "978-1982137274", 1989),
];

const MEMBERS: &[(&str, &str)] = &[
    ("Alice Johnson", "alice.johnson@email.com"),
    ("Bob Smith", "bob.smith@email.com"),
    ("Carol Williams", "carol.williams@email.com"),
    ("David Brown", "david.brown@email.com"),
    ("Emma Davis", "emma.davis@email.com"),
    ("Frank Miller", "frank.miller@email.com"),
    ("Grace Wilson", "grace.wilson@email.com"),
    ("Henry Taylor", "henry.taylor@email.com"),
];

/// (book title, member name, days ago borrowed, loan days, returned)
const LOANS: &[(&str, &str, u64, i64, bool)] = &[
    ("Python Crash Course", "Alice Johnson", 5, 14, false),
    ("Clean Code", "Bob Smith", 3, 14, false),
    ("1984", "Carol Williams", 7, 21, false),
    ("Sapiens", "David Brown", 2, 14, false),
    ("Atomic Habits", "Emma Davis", 10, 14, false),
    ("The Great Gatsby", "Alice Johnson", 30, 14, true),
    ("To Kill a Mockingbird", "Bob Smith", 45, 21, true),
    ("A Brief History of Time", "Frank Miller", 60, 14, true),
    ("The Pragmatic Programmer", "Grace Wilson", 25, 14, true),
    ("Thinking, Fast and Slow", "Henry Taylor", 40, 21, true),
    ("Cosmos", "Carol Williams", 20, 14, false),
];

/// Row counts written by `seed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub books: usize,
    pub members: usize,
    pub active_loans: usize,
    pub returned_loans: usize,
    /// Active loans already past due; also counted in `active_loans`.
    pub overdue_loans: usize,
}

/// Clears the library tables and loads the sample data dated from today.
pub fn seed(db: &Database) -> RepoResult<SeedSummary> {
    seed_on(db, today())
}

/// Clears the library tables and loads the sample data dated from `today`.
pub fn seed_on(db: &Database, today: NaiveDate) -> RepoResult<SeedSummary> {
    clear_library(db)?;

    let books = SqliteBookRepository::new(db);
    let members = SqliteMemberRepository::new(db);
    let library = LibraryService::new(db);
    let mut summary = SeedSummary::default();

    let mut book_ids = HashMap::new();
    for (title, author, isbn, year) in BOOKS {
        let id = books.create(&NewBook::new(*title, *author, *isbn).published(*year))?;
        book_ids.insert(*title, id);
        summary.books += 1;
    }

    let mut member_ids = HashMap::new();
    for (name, email) in MEMBERS {
        let id = members.create(&NewMember::new(*name, *email))?;
        member_ids.insert(*name, id);
        summary.members += 1;
    }

    for (title, member, days_ago, loan_days, returned) in LOANS {
        let (Some(book_id), Some(member_id)) = (book_ids.get(title), member_ids.get(member))
        else {
            continue;
        };
        let loan_date = days_before(today, *days_ago)?;
        let loan_id = library.borrow_book_on(*book_id, *member_id, *loan_days, loan_date)?;

        if *returned {
            let return_date = days_after(loan_date, (*loan_days - 2).max(0))?;
            library.return_book_on(loan_id, return_date)?;
            summary.returned_loans += 1;
        } else {
            summary.active_loans += 1;
            if days_after(loan_date, *loan_days)? < today {
                summary.overdue_loans += 1;
            }
        }
    }

    info!(
        "event=seed module=sample_data status=ok books={} members={} active_loans={} returned_loans={} overdue_loans={}",
        summary.books,
        summary.members,
        summary.active_loans,
        summary.returned_loans,
        summary.overdue_loans
    );
    Ok(summary)
}

fn clear_library(db: &Database) -> RepoResult<()> {
    db.transaction(|tx| {
        tx.execute_batch(
            "DELETE FROM loans;
             DELETE FROM members;
             DELETE FROM books;",
        )?;
        Ok::<_, RepoError>(())
    })
}

fn days_before(date: NaiveDate, days: u64) -> RepoResult<NaiveDate> {
    date.checked_sub_days(Days::new(days))
        .ok_or_else(|| RepoError::validation("Loan date", "Loan date is out of range"))
}

fn days_after(date: NaiveDate, days: i64) -> RepoResult<NaiveDate> {
    u64::try_from(days)
        .ok()
        .and_then(|days| date.checked_add_days(Days::new(days)))
        .ok_or_else(|| RepoError::validation("Due date", "Due date is out of range"))
}
