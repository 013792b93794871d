//! Book repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and search over the `books` table.
//! - Report ISBN collisions as `Duplicate` and referenced deletes as
//!   `Referential`.
//!
//! # Invariants
//! - `available` is never written here; the library service owns it.

use crate::db::Database;
use crate::model::book::{Book, BookPatch, BookSearchField, BookSort, NewBook};
use crate::model::RowId;
use crate::repo::{current_year, like_contains, map_write_error, Assignments, RepoResult};
use log::info;
use rusqlite::{params, params_from_iter, Row};

pub(crate) const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    author,
    isbn,
    published_year,
    available,
    created_at
FROM books";

/// Query options for listing books.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookListQuery {
    pub available_only: bool,
    pub sort: BookSort,
}

/// Repository interface for book CRUD operations.
pub trait BookRepository {
    fn create(&self, book: &NewBook) -> RepoResult<RowId>;
    fn get_by_id(&self, id: RowId) -> RepoResult<Option<Book>>;
    fn get_all(&self, query: &BookListQuery) -> RepoResult<Vec<Book>>;
    /// Case-insensitive substring match on one column.
    fn search(&self, term: &str, field: BookSearchField) -> RepoResult<Vec<Book>>;
    fn update(&self, id: RowId, patch: &BookPatch) -> RepoResult<bool>;
    fn delete(&self, id: RowId) -> RepoResult<bool>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'db> {
    db: &'db Database,
}

impl<'db> SqliteBookRepository<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self { db }
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn create(&self, book: &NewBook) -> RepoResult<RowId> {
        book.validate(current_year())?;

        let id = self
            .db
            .insert(
                "INSERT INTO books (title, author, isbn, published_year)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    book.title.as_str(),
                    book.author.as_str(),
                    book.isbn.as_str(),
                    book.published_year,
                ],
            )
            .map_err(|err| {
                map_write_error(
                    err,
                    || {
                        format!(
                            "A book with ISBN '{}' already exists. Each book must have a unique ISBN.",
                            book.isbn
                        )
                    },
                    || "Invalid reference while creating book".to_string(),
                )
            })?;

        info!("event=book_create module=library status=ok id={id}");
        Ok(id)
    }

    fn get_by_id(&self, id: RowId) -> RepoResult<Option<Book>> {
        let book = self.db.query_optional(
            &format!("{BOOK_SELECT_SQL} WHERE id = ?1;"),
            [id],
            book_from_row,
        )?;
        Ok(book)
    }

    fn get_all(&self, query: &BookListQuery) -> RepoResult<Vec<Book>> {
        let mut sql = String::from(BOOK_SELECT_SQL);
        if query.available_only {
            sql.push_str(" WHERE available = 1");
        }
        sql.push_str(&format!(" ORDER BY {} ASC, id ASC;", query.sort.column()));

        Ok(self.db.query_map(&sql, [], book_from_row)?)
    }

    fn search(&self, term: &str, field: BookSearchField) -> RepoResult<Vec<Book>> {
        let column = field.column();
        let sql = format!(
            "{BOOK_SELECT_SQL}
             WHERE {column} LIKE ?1 ESCAPE '\\'
             ORDER BY {column} ASC, id ASC;"
        );
        Ok(self.db.query_map(&sql, [like_contains(term)], book_from_row)?)
    }

    fn update(&self, id: RowId, patch: &BookPatch) -> RepoResult<bool> {
        patch.validate(current_year())?;

        let mut assignments = Assignments::default();
        assignments.set_some("title", patch.title.clone());
        assignments.set_some("author", patch.author.clone());
        assignments.set_some("isbn", patch.isbn.clone());
        assignments.set_some("published_year", patch.published_year);
        let (sql, values) = assignments.into_statement("books", id);

        let changed = self
            .db
            .update(&sql, params_from_iter(values))
            .map_err(|err| {
                map_write_error(
                    err,
                    || "Cannot update: Another book already has this ISBN".to_string(),
                    || "Invalid reference while updating book".to_string(),
                )
            })?;
        Ok(changed > 0)
    }

    fn delete(&self, id: RowId) -> RepoResult<bool> {
        let changed = self
            .db
            .update("DELETE FROM books WHERE id = ?1;", [id])
            .map_err(|err| {
                map_write_error(
                    err,
                    || format!("Cannot delete book {id}"),
                    || {
                        "Cannot delete book: It is referenced in loan records. \
                         You must delete or update related loans first."
                            .to_string()
                    },
                )
            })?;
        Ok(changed > 0)
    }
}

pub(crate) fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get("id")?,
        title: row.get("title")?,
        author: row.get("author")?,
        isbn: row.get("isbn")?,
        published_year: row.get("published_year")?,
        available: row.get("available")?,
        created_at: row.get("created_at")?,
    })
}
