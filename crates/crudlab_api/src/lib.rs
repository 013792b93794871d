//! JSON envelope layer for crudlab.
//!
//! Every handler returns an [`ApiResponse`] carrying a conventional HTTP
//! status, so any transport can forward it unchanged.

mod api;
mod envelope;

pub use api::{Api, BorrowRequest};
pub use envelope::{status_for, ApiResponse};
