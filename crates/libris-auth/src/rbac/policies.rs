//! Role-to-permission mapping definitions.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use libris_entity::user::UserRole;

/// A library-wide permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemPermission {
    // Catalogue
    /// Browse books, authors and categories.
    CatalogueRead,
    /// Create, edit and delete books.
    BookManage,
    /// Create, edit and delete authors.
    AuthorManage,
    /// Create, edit and delete categories.
    CategoryManage,

    // Loans
    /// Borrow a book for oneself.
    LoanBorrow,
    /// Return one's own loans.
    LoanReturnOwn,
    /// Return any member's loan.
    LoanReturnAny,
    /// See every member's loans.
    LoanViewAll,

    // Users
    /// Manage other accounts.
    UserManage,

    // Reports
    /// See system-wide dashboard totals.
    StatsViewSystem,

    // System
    /// Access health endpoints.
    SystemHealth,
}

/// Defines the mapping from each role to its set of allowed permissions.
#[derive(Debug, Clone)]
pub struct RbacPolicies {
    policies: HashMap<UserRole, HashSet<SystemPermission>>,
}

impl RbacPolicies {
    /// Creates the default policy set.
    pub fn new() -> Self {
        use SystemPermission::*;

        let borrower: HashSet<_> = [
            CatalogueRead,
            LoanBorrow,
            LoanReturnOwn,
            SystemHealth,
        ]
        .into_iter()
        .collect();

        // Librarian: borrower + catalogue curation and loan oversight
        let mut librarian = borrower.clone();
        librarian.extend([
            BookManage,
            AuthorManage,
            CategoryManage,
            LoanReturnAny,
            LoanViewAll,
            StatsViewSystem,
        ]);

        let mut admin = librarian.clone();
        admin.insert(UserManage);

        let mut policies = HashMap::new();
        policies.insert(UserRole::Borrower, borrower);
        policies.insert(UserRole::Librarian, librarian);
        policies.insert(UserRole::Admin, admin);

        Self { policies }
    }

    /// Checks whether the given role has the specified permission.
    pub fn has_permission(&self, role: &UserRole, permission: &SystemPermission) -> bool {
        self.policies
            .get(role)
            .is_some_and(|perms| perms.contains(permission))
    }

    /// Returns all permissions for a given role.
    pub fn permissions_for(&self, role: &UserRole) -> Vec<SystemPermission> {
        let mut perms: Vec<_> = self
            .policies
            .get(role)
            .map(|p| p.iter().copied().collect())
            .unwrap_or_default();
        perms.sort_by_key(|p| format!("{p:?}"));
        perms
    }
}

impl Default for RbacPolicies {
    fn default() -> Self {
        Self::new()
    }
}
