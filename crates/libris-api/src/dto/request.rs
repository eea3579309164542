//! Request DTOs with validation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use libris_core::types::{AuthorId, BookId, CategoryId};
use libris_entity::author::{CreateAuthor, UpdateAuthor};
use libris_entity::book::{CreateBook, UpdateBook};
use libris_entity::category::{CreateCategory, UpdateCategory};

/// Create book request. There is no `available` field: new books are
/// always available.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateBookRequest {
    /// Title.
    #[validate(length(min = 1, max = 500, message = "can't be blank"))]
    pub title: String,
    /// ISBN.
    #[validate(length(min = 1, max = 32, message = "can't be blank"))]
    pub isbn: String,
    /// Description.
    pub description: Option<String>,
    /// Publication date (`YYYY-MM-DD`).
    pub publication_date: Option<NaiveDate>,
    /// Author.
    pub author_id: AuthorId,
    /// Category.
    pub category_id: CategoryId,
}

impl From<CreateBookRequest> for CreateBook {
    fn from(req: CreateBookRequest) -> Self {
        Self {
            title: req.title,
            isbn: req.isbn,
            description: req.description,
            publication_date: req.publication_date,
            author_id: req.author_id,
            category_id: req.category_id,
        }
    }
}

/// Update book request. Unknown fields, including `available`, are rejected.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateBookRequest {
    /// New title.
    #[validate(length(min = 1, max = 500, message = "can't be blank"))]
    pub title: Option<String>,
    /// New ISBN.
    #[validate(length(min = 1, max = 32, message = "can't be blank"))]
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

impl UpdateBookRequest {
    /// Attach the target id.
    pub fn into_update(self, id: BookId) -> UpdateBook {
        UpdateBook {
            id,
            title: self.title,
            isbn: self.isbn,
            description: self.description,
            publication_date: self.publication_date,
            author_id: self.author_id,
            category_id: self.category_id,
        }
    }
}

/// Borrow request for `POST /api/loans`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLoanRequest {
    /// Book to borrow.
    pub book_id: BookId,
    /// Requested due date; defaults to the policy loan length.
    pub due_date: Option<DateTime<Utc>>,
}

/// Optional body for `POST /api/books/{id}/borrow`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BorrowBookRequest {
    /// Requested due date.
    pub due_date: Option<DateTime<Utc>>,
}

/// Create or replace an author.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAuthorRequest {
    /// Full name.
    #[validate(length(min = 1, max = 255, message = "can't be blank"))]
    pub name: String,
    /// Biography.
    pub bio: Option<String>,
}

impl From<CreateAuthorRequest> for CreateAuthor {
    fn from(req: CreateAuthorRequest) -> Self {
        Self {
            name: req.name,
            bio: req.bio,
        }
    }
}

/// Partial author update.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateAuthorRequest {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "can't be blank"))]
    pub name: Option<String>,
    /// New biography.
    pub bio: Option<String>,
}

impl UpdateAuthorRequest {
    /// Attach the target id.
    pub fn into_update(self, id: AuthorId) -> UpdateAuthor {
        UpdateAuthor {
            id,
            name: self.name,
            bio: self.bio,
        }
    }
}

/// Create a category.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    /// Unique name.
    #[validate(length(min = 1, max = 255, message = "can't be blank"))]
    pub name: String,
    /// Description.
    pub description: Option<String>,
}

impl From<CreateCategoryRequest> for CreateCategory {
    fn from(req: CreateCategoryRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
        }
    }
}

/// Partial category update.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "can't be blank"))]
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
}

impl UpdateCategoryRequest {
    /// Attach the target id.
    pub fn into_update(self, id: CategoryId) -> UpdateCategory {
        UpdateCategory {
            id,
            name: self.name,
            description: self.description,
        }
    }
}

/// Query string for `GET /api/books`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookQuery {
    /// Free-text search over title, ISBN and description.
    pub search: Option<String>,
    /// Category filter.
    pub category_id: Option<String>,
    /// Author filter.
    pub author_id: Option<String>,
    /// `true` or `false`.
    pub available: Option<String>,
    /// Page number.
    pub page: Option<u64>,
    /// Page size.
    pub per_page: Option<u64>,
}

/// Query string for author and category listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Name filter.
    pub search: Option<String>,
    /// Page number.
    pub page: Option<u64>,
    /// Page size.
    pub per_page: Option<u64>,
}

/// Query string for `GET /api/loans`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanQuery {
    /// `active`, `returned` or `overdue`.
    pub filter: Option<String>,
    /// `all` lists every member's loans (staff only).
    pub scope: Option<String>,
    /// Page number.
    pub page: Option<u64>,
    /// Page size.
    pub per_page: Option<u64>,
}

/// Query string for `GET /api/books/validate_isbn`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateIsbnQuery {
    /// ISBN to check.
    pub isbn: String,
    /// Book being edited, ignored in the uniqueness check.
    pub exclude_id: Option<String>,
}
