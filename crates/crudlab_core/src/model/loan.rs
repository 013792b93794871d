//! Loan records linking a book to a member.
//!
//! # Invariants
//! - A loan is `Active` until `return_date` is set, then `Returned`
//!   forever; there is no cancellation state.
//! - At most one active loan exists per book.

use super::RowId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanState {
    Active,
    Returned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: RowId,
    pub book_id: RowId,
    pub member_id: RowId,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
}

impl Loan {
    pub fn state(&self) -> LoanState {
        match self.return_date {
            Some(_) => LoanState::Returned,
            None => LoanState::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == LoanState::Active
    }

    /// Active and past its due date as of `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_active() && self.due_date < today
    }
}

/// A member's loan joined with the borrowed book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberLoan {
    #[serde(flatten)]
    pub loan: Loan,
    pub book_title: String,
    pub book_author: String,
    pub book_isbn: String,
}

/// An overdue loan joined with its book and member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueLoan {
    #[serde(flatten)]
    pub loan: Loan,
    pub book_title: String,
    pub book_author: String,
    pub member_name: String,
    pub member_email: String,
}

impl OverdueLoan {
    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        (today - self.loan.due_date).num_days().max(0)
    }
}
