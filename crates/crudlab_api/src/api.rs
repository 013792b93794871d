//! Request handlers over the core services.
//!
//! # Responsibility
//! - Decode JSON request bodies, call one core operation, and wrap the
//!   outcome in an `ApiResponse`.
//!
//! # Invariants
//! - Handlers never panic and never add business rules of their own.
//! - Absence is reported as 404; the core's `Ok(None)` / `Ok(false)` are
//!   translated here, not earlier.

use crate::envelope::{ApiResponse, STATUS_CREATED, STATUS_INTERNAL_ERROR, STATUS_OK};
use crudlab_core::model::book::{BookPatch, BookSearchField, BookSort, NewBook};
use crudlab_core::model::member::{MemberSort, NewMember};
use crudlab_core::model::task::{NewTask, TaskPatch, TaskStatus};
use crudlab_core::repo::book_repo::{BookListQuery, BookRepository, SqliteBookRepository};
use crudlab_core::repo::loan_repo::{LoanRepository, SqliteLoanRepository};
use crudlab_core::repo::member_repo::{MemberRepository, SqliteMemberRepository};
use crudlab_core::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crudlab_core::{
    Database, DbConfig, DbError, LibraryService, RepoError, RepoResult, RowId, ValidationError,
    DEFAULT_LOAN_DAYS,
};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Body of `borrow_book`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BorrowRequest {
    pub book_id: RowId,
    pub member_id: RowId,
    #[serde(default = "default_loan_days")]
    pub loan_days: i64,
}

fn default_loan_days() -> i64 {
    DEFAULT_LOAN_DAYS
}

/// Envelope-producing facade over one database.
#[derive(Debug, Clone)]
pub struct Api {
    db: Database,
}

impl Api {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Opens (and migrates) the database described by `config`.
    pub fn open(config: DbConfig) -> Result<Self, DbError> {
        Database::open(config).map(Self::new)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // Books

    pub fn list_books(&self, available_only: bool, sort: Option<&str>) -> ApiResponse {
        respond("list_books", STATUS_OK, || {
            let sort = parse_or_default::<BookSort>(sort)?;
            SqliteBookRepository::new(&self.db).get_all(&BookListQuery {
                available_only,
                sort,
            })
        })
    }

    pub fn get_book(&self, id: RowId) -> ApiResponse {
        respond("get_book", STATUS_OK, || {
            SqliteBookRepository::new(&self.db)
                .get_by_id(id)?
                .ok_or(not_found("Book", id))
        })
    }

    pub fn create_book(&self, body: &str) -> ApiResponse {
        respond("create_book", STATUS_CREATED, || {
            let book: NewBook = decode(body)?;
            let id = SqliteBookRepository::new(&self.db).create(&book)?;
            Ok(json!({ "id": id }))
        })
    }

    pub fn update_book(&self, id: RowId, body: &str) -> ApiResponse {
        respond("update_book", STATUS_OK, || {
            let patch: BookPatch = decode(body)?;
            let repo = SqliteBookRepository::new(&self.db);
            if !repo.update(id, &patch)? {
                return Err(not_found("Book", id));
            }
            repo.get_by_id(id)?.ok_or(not_found("Book", id))
        })
    }

    pub fn delete_book(&self, id: RowId) -> ApiResponse {
        respond("delete_book", STATUS_OK, || {
            deleted(SqliteBookRepository::new(&self.db).delete(id)?, "Book", id)
        })
    }

    pub fn search_books(&self, term: &str, field: Option<&str>) -> ApiResponse {
        respond("search_books", STATUS_OK, || {
            let field = parse_or_default::<BookSearchField>(field)?;
            SqliteBookRepository::new(&self.db).search(term, field)
        })
    }

    // Members

    pub fn list_members(&self, sort: Option<&str>) -> ApiResponse {
        respond("list_members", STATUS_OK, || {
            let sort = parse_or_default::<MemberSort>(sort)?;
            SqliteMemberRepository::new(&self.db).get_all(sort)
        })
    }

    pub fn get_member(&self, id: RowId) -> ApiResponse {
        respond("get_member", STATUS_OK, || {
            SqliteMemberRepository::new(&self.db)
                .get_by_id(id)?
                .ok_or(not_found("Member", id))
        })
    }

    pub fn create_member(&self, body: &str) -> ApiResponse {
        respond("create_member", STATUS_CREATED, || {
            let member: NewMember = decode(body)?;
            let id = SqliteMemberRepository::new(&self.db).create(&member)?;
            Ok(json!({ "id": id }))
        })
    }

    // Loans

    pub fn borrow_book(&self, body: &str) -> ApiResponse {
        respond("borrow_book", STATUS_CREATED, || {
            let request: BorrowRequest = decode(body)?;
            let loan_id = LibraryService::new(&self.db).borrow_book(
                request.book_id,
                request.member_id,
                request.loan_days,
            )?;
            SqliteLoanRepository::new(&self.db)
                .get_by_id(loan_id)?
                .ok_or(not_found("Loan", loan_id))
        })
    }

    pub fn return_book(&self, loan_id: RowId) -> ApiResponse {
        respond("return_book", STATUS_OK, || {
            if !LibraryService::new(&self.db).return_book(loan_id)? {
                return Err(not_found("Loan", loan_id));
            }
            SqliteLoanRepository::new(&self.db)
                .get_by_id(loan_id)?
                .ok_or(not_found("Loan", loan_id))
        })
    }

    pub fn active_loans(&self) -> ApiResponse {
        respond("active_loans", STATUS_OK, || {
            SqliteLoanRepository::new(&self.db).get_active()
        })
    }

    // Tasks

    pub fn list_tasks(&self, status: Option<&str>) -> ApiResponse {
        respond("list_tasks", STATUS_OK, || {
            let status = status.map(str::parse::<TaskStatus>).transpose()?;
            SqliteTaskRepository::new(&self.db).get_all(status)
        })
    }

    pub fn get_task(&self, id: RowId) -> ApiResponse {
        respond("get_task", STATUS_OK, || {
            SqliteTaskRepository::new(&self.db)
                .get_by_id(id)?
                .ok_or(not_found("Task", id))
        })
    }

    pub fn create_task(&self, body: &str) -> ApiResponse {
        respond("create_task", STATUS_CREATED, || {
            let task: NewTask = decode(body)?;
            let id = SqliteTaskRepository::new(&self.db).create(&task)?;
            Ok(json!({ "id": id }))
        })
    }

    pub fn update_task(&self, id: RowId, body: &str) -> ApiResponse {
        respond("update_task", STATUS_OK, || {
            let patch: TaskPatch = decode(body)?;
            let repo = SqliteTaskRepository::new(&self.db);
            if !repo.update(id, &patch)? {
                return Err(not_found("Task", id));
            }
            repo.get_by_id(id)?.ok_or(not_found("Task", id))
        })
    }

    pub fn delete_task(&self, id: RowId) -> ApiResponse {
        respond("delete_task", STATUS_OK, || {
            deleted(SqliteTaskRepository::new(&self.db).delete(id)?, "Task", id)
        })
    }
}

fn respond<T, F>(handler: &'static str, success_status: u16, work: F) -> ApiResponse
where
    T: Serialize,
    F: FnOnce() -> RepoResult<T>,
{
    let response = match work().map(serde_json::to_value) {
        Ok(Ok(data)) if success_status == STATUS_CREATED => ApiResponse::created(data),
        Ok(Ok(data)) => ApiResponse::ok(data),
        Ok(Err(err)) => ApiResponse::failure(
            STATUS_INTERNAL_ERROR,
            format!("failed to encode response: {err}"),
        ),
        Err(err) => ApiResponse::from_error(&err),
    };

    if response.success {
        debug!(
            "event=api_request module=api status=ok handler={handler} http_status={}",
            response.status
        );
    } else {
        warn!(
            "event=api_request module=api status=error handler={handler} http_status={}",
            response.status
        );
    }
    response
}

fn decode<T: DeserializeOwned>(body: &str) -> RepoResult<T> {
    serde_json::from_str(body).map_err(|err| {
        RepoError::Validation(ValidationError::new(
            "Body",
            format!("Invalid request body: {err}"),
        ))
    })
}

fn parse_or_default<T>(value: Option<&str>) -> RepoResult<T>
where
    T: std::str::FromStr<Err = ValidationError> + Default,
{
    Ok(value.map(str::parse::<T>).transpose()?.unwrap_or_default())
}

fn not_found(entity: &'static str, id: RowId) -> RepoError {
    RepoError::NotFound { entity, id }
}

fn deleted(removed: bool, entity: &'static str, id: RowId) -> RepoResult<serde_json::Value> {
    if !removed {
        return Err(not_found(entity, id));
    }
    Ok(json!({ "deleted": id }))
}
