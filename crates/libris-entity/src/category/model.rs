//! Category entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use libris_core::types::{CategoryId, ValidationErrors};

/// A shelf category (genre, subject, ...).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Unique name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
    /// When the category was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A category with the number of books filed under it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategoryWithCount {
    /// The category row.
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub category: Category,
    /// Number of books in the category.
    pub books_count: i64,
}

/// Data required to create a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    /// Name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
}

impl CreateCategory {
    /// Name must be present.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        if self.name.trim().is_empty() {
            return Err(ValidationErrors::single("name", "can't be blank"));
        }
        Ok(())
    }
}

/// Data for updating a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCategory {
    /// The category to update.
    pub id: CategoryId,
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
}

impl UpdateCategory {
    /// A replacement name must not be blank.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ValidationErrors::single("name", "can't be blank"));
        }
        Ok(())
    }
}
