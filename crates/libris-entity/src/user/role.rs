//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available to library accounts.
///
/// Roles are ordered by privilege level: Admin > Librarian > Borrower.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// A member who borrows books.
    #[default]
    Borrower,
    /// Staff who curate the catalogue and oversee loans.
    Librarian,
    /// Full system administrator.
    Admin,
}

impl UserRole {
    /// Return the privilege level (higher = more privileged).
    pub fn privilege_level(&self) -> u8 {
        match self {
            Self::Admin => 3,
            Self::Librarian => 2,
            Self::Borrower => 1,
        }
    }

    /// Check if this role has at least the given role's privileges.
    pub fn has_at_least(&self, other: &UserRole) -> bool {
        self.privilege_level() >= other.privilege_level()
    }

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Librarian or admin.
    pub fn can_manage_books(&self) -> bool {
        self.has_at_least(&Self::Librarian)
    }

    /// Admin only.
    pub fn can_manage_users(&self) -> bool {
        self.is_admin()
    }

    /// Librarian or admin.
    pub fn can_view_all_loans(&self) -> bool {
        self.has_at_least(&Self::Librarian)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Librarian => "librarian",
            Self::Borrower => "borrower",
        }
    }

    /// Capitalized label for display.
    pub fn display_role(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Librarian => "Librarian",
            Self::Borrower => "Borrower",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = libris_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "librarian" => Ok(Self::Librarian),
            "borrower" => Ok(Self::Borrower),
            _ => Err(libris_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: borrower, librarian, admin"
            ))),
        }
    }
}
