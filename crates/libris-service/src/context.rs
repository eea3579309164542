//! Request context carrying the acting user.

use chrono::{DateTime, Utc};
use serde::Serialize;

use libris_core::types::UserId;
use libris_entity::user::{User, UserRole};

/// Who is acting on the current request.
///
/// Built by the API layer once the gateway-asserted user has been loaded,
/// and passed into every service call.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    /// The acting user.
    pub user: User,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user: User, request_time: DateTime<Utc>) -> Self {
        Self { user, request_time }
    }

    /// The acting user's id.
    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    /// The acting user's role.
    pub fn role(&self) -> UserRole {
        self.user.role
    }

    /// Librarian or admin.
    pub fn is_staff(&self) -> bool {
        self.user.role.has_at_least(&UserRole::Librarian)
    }
}
