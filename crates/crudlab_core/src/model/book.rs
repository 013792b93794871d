//! Book catalog records.
//!
//! # Invariants
//! - `isbn` is unique across all books (enforced by the store).
//! - `available` is derived state owned by the loan availability rule; it
//!   is not part of `BookPatch`.

use super::{empty_patch_error, RowId};
use crate::validation::{self, ValidationError, ValidationResult};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: RowId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub published_year: Option<i32>,
    /// `false` while an active loan exists for this book.
    pub available: bool,
    pub created_at: NaiveDateTime,
}

/// Input for `BookRepository::create`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    /// Stored as given. Validation ignores `-` and spaces, but uniqueness
    /// compares the stored text, so `978-0132350884` and `9780132350884`
    /// are distinct rows.
    pub isbn: String,
    #[serde(default)]
    pub published_year: Option<i32>,
}

impl NewBook {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            published_year: None,
        }
    }

    pub fn published(mut self, year: i32) -> Self {
        self.published_year = Some(year);
        self
    }

    pub fn validate(&self, current_year: i32) -> ValidationResult {
        validation::not_empty(&self.title, "Title")?;
        validation::not_empty(&self.author, "Author")?;
        validation::isbn(&self.isbn)?;
        validation::published_year(self.published_year, current_year)
    }
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub published_year: Option<i32>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.isbn.is_none()
            && self.published_year.is_none()
    }

    pub fn validate(&self, current_year: i32) -> ValidationResult {
        if self.is_empty() {
            return Err(empty_patch_error());
        }
        if let Some(title) = &self.title {
            validation::not_empty(title, "Title")?;
        }
        if let Some(author) = &self.author {
            validation::not_empty(author, "Author")?;
        }
        if let Some(isbn) = &self.isbn {
            validation::isbn(isbn)?;
        }
        validation::published_year(self.published_year, current_year)
    }
}

/// Whitelisted ordering columns for book listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookSort {
    #[default]
    Title,
    Author,
    CreatedAt,
    PublishedYear,
}

impl BookSort {
    pub const ALL: [&'static str; 4] = ["title", "author", "created_at", "published_year"];

    pub fn column(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::CreatedAt => "created_at",
            Self::PublishedYear => "published_year",
        }
    }
}

impl FromStr for BookSort {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            "created_at" => Ok(Self::CreatedAt),
            "published_year" => Ok(Self::PublishedYear),
            other => Err(ValidationError::new(
                "Sort field",
                format!(
                    "Invalid sort field '{other}'. Must be one of: {}",
                    Self::ALL.join(", ")
                ),
            )),
        }
    }
}

/// Column searched by `BookRepository::search`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookSearchField {
    #[default]
    Title,
    Author,
}

impl BookSearchField {
    pub fn column(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
        }
    }
}

impl FromStr for BookSearchField {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            _ => Err(ValidationError::new(
                "Search field",
                "search_field must be 'title' or 'author'",
            )),
        }
    }
}
