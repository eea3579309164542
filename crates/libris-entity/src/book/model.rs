//! Book entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use libris_core::types::{AuthorId, BookId, CategoryId, ValidationErrors};

/// A catalogue entry.
///
/// `available` is owned by the loan lifecycle: it is `false` exactly while
/// an unreturned loan references the book. Catalogue edits never write it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    /// Unique book identifier.
    pub id: BookId,
    /// Title.
    pub title: String,
    /// ISBN, unique across the catalogue.
    pub isbn: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Publication date, if known.
    pub publication_date: Option<NaiveDate>,
    /// Whether the book can currently be borrowed.
    pub available: bool,
    /// Author of the book.
    pub author_id: AuthorId,
    /// Category the book is filed under.
    pub category_id: CategoryId,
    /// When the book was created.
    pub created_at: DateTime<Utc>,
    /// When the book was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Whether the book is out on loan.
    pub fn is_borrowed(&self) -> bool {
        !self.available
    }
}

/// A book joined with its author and category names.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookDetails {
    /// The book row.
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub book: Book,
    /// Author name.
    pub author_name: String,
    /// Category name.
    pub category_name: String,
}

impl BookDetails {
    /// `"Title - Author (Category)"`, as shown in borrow pickers.
    pub fn display_title(&self) -> String {
        format!(
            "{} - {} ({})",
            self.book.title, self.author_name, self.category_name
        )
    }
}

/// Data required to create a new book. New books are always available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBook {
    /// Title.
    pub title: String,
    /// ISBN.
    pub isbn: String,
    /// Description.
    pub description: Option<String>,
    /// Publication date.
    pub publication_date: Option<NaiveDate>,
    /// Author.
    pub author_id: AuthorId,
    /// Category.
    pub category_id: CategoryId,
}

impl CreateBook {
    /// Check presence of the required text fields.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.title.trim().is_empty() {
            errors.add("title", "can't be blank");
        }
        if self.isbn.trim().is_empty() {
            errors.add("isbn", "can't be blank");
        }
        errors.into_result()
    }
}

/// Data for updating a book. There is deliberately no `available` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBook {
    /// The book to update.
    pub id: BookId,
    /// New title.
    pub title: Option<String>,
    /// New ISBN.
    pub isbn: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New publication date.
    pub publication_date: Option<NaiveDate>,
    /// New author.
    pub author_id: Option<AuthorId>,
    /// New category.
    pub category_id: Option<CategoryId>,
}

impl UpdateBook {
    /// Reject blank replacements for required fields.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            errors.add("title", "can't be blank");
        }
        if self.isbn.as_deref().is_some_and(|i| i.trim().is_empty()) {
            errors.add("isbn", "can't be blank");
        }
        errors.into_result()
    }
}

/// Catalogue search criteria. Every field is optional and they combine
/// with `AND`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookFilter {
    /// Case-insensitive match on title, ISBN or description.
    pub search: Option<String>,
    /// Restrict to one category.
    pub category_id: Option<CategoryId>,
    /// Restrict to one author.
    pub author_id: Option<AuthorId>,
    /// `Some(true)` for available books, `Some(false)` for borrowed ones.
    pub available: Option<bool>,
}
