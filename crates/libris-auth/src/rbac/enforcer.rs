//! RBAC enforcement: turns policy lookups into `Forbidden` errors.

use tracing::debug;

use libris_core::error::AppError;
use libris_core::types::UserId;
use libris_entity::user::{User, UserRole};

use super::policies::{RbacPolicies, SystemPermission};

/// Enforces role-based access control.
#[derive(Debug, Clone, Default)]
pub struct RbacEnforcer {
    policies: RbacPolicies,
}

impl RbacEnforcer {
    /// Creates a new enforcer with the default policy set.
    pub fn new() -> Self {
        Self {
            policies: RbacPolicies::new(),
        }
    }

    /// Creates an enforcer with custom policies.
    pub fn with_policies(policies: RbacPolicies) -> Self {
        Self { policies }
    }

    /// Fails with `Forbidden` unless `role` holds `permission`.
    pub fn require_permission(
        &self,
        role: &UserRole,
        permission: &SystemPermission,
    ) -> Result<(), AppError> {
        if self.policies.has_permission(role, permission) {
            Ok(())
        } else {
            debug!(%role, ?permission, "Permission denied");
            Err(AppError::forbidden(
                "You are not authorized to perform this action.",
            ))
        }
    }

    /// Checks whether the role has the permission.
    pub fn has_permission(&self, role: &UserRole, permission: &SystemPermission) -> bool {
        self.policies.has_permission(role, permission)
    }

    /// Allow `actor` to act on a record owned by `owner`: always when
    /// they are the owner, otherwise only with `any_permission`.
    pub fn require_owner_or(
        &self,
        actor: &User,
        owner: UserId,
        any_permission: &SystemPermission,
    ) -> Result<(), AppError> {
        if actor.id == owner {
            return Ok(());
        }
        self.require_permission(&actor.role, any_permission)
    }

    /// Returns a reference to the underlying policies.
    pub fn policies(&self) -> &RbacPolicies {
        &self.policies
    }
}
