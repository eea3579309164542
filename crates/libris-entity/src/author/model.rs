//! Author entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use libris_core::types::{AuthorId, ValidationErrors};

/// A book author.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Author {
    /// Unique author identifier.
    pub id: AuthorId,
    /// Full name.
    pub name: String,
    /// Short biography.
    pub bio: Option<String>,
    /// When the author was created.
    pub created_at: DateTime<Utc>,
    /// When the author was last updated.
    pub updated_at: DateTime<Utc>,
}

/// An author with the number of catalogue entries they wrote.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuthorWithCount {
    /// The author row.
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub author: Author,
    /// Number of books referencing this author.
    pub books_count: i64,
}

/// Data required to create an author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuthor {
    /// Full name.
    pub name: String,
    /// Biography.
    pub bio: Option<String>,
}

impl CreateAuthor {
    /// Name must be present.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        if self.name.trim().is_empty() {
            return Err(ValidationErrors::single("name", "can't be blank"));
        }
        Ok(())
    }
}

/// Data for updating an author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAuthor {
    /// The author to update.
    pub id: AuthorId,
    /// New name.
    pub name: Option<String>,
    /// New biography.
    pub bio: Option<String>,
}

impl UpdateAuthor {
    /// A replacement name must not be blank.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ValidationErrors::single("name", "can't be blank"));
        }
        Ok(())
    }
}
