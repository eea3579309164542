//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use libris_core::types::UserId;

use super::role::UserRole;

/// A library member or staff account.
///
/// Identity is asserted upstream; this record only carries what the
/// library needs: who the person is and which role they hold.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique email address.
    pub email: String,
    /// Display name.
    pub name: Option<String>,
    /// Library role.
    pub role: UserRole,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Librarians and admins may create, edit and delete catalogue entries.
    pub fn can_manage_books(&self) -> bool {
        self.role.can_manage_books()
    }

    /// Only admins may manage other accounts.
    pub fn can_manage_users(&self) -> bool {
        self.role.can_manage_users()
    }

    /// Librarians and admins see every member's loans.
    pub fn can_view_all_loans(&self) -> bool {
        self.role.can_view_all_loans()
    }

    /// Name to show in listings, falling back to the email address.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address.
    pub email: String,
    /// Display name (optional).
    pub name: Option<String>,
    /// Assigned role.
    pub role: UserRole,
}
