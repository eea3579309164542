//! User profile service.

use std::sync::Arc;

use serde::Serialize;

use libris_core::result::AppResult;
use libris_core::traits::Clock;
use libris_core::types::{UserId, ValidationErrors};
use libris_database::repositories::{LoanRepository, UserRepository};
use libris_entity::loan::BorrowingPolicy;
use libris_entity::user::{Borrower, CreateUser, User};

use crate::context::RequestContext;

/// The acting user with their lending standing.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    /// The account.
    #[serde(flatten)]
    pub user: User,
    /// Unreturned loans.
    pub active_loans: i64,
    /// Unreturned loans past due.
    pub overdue_loans: i64,
    /// Maximum concurrent loans.
    pub max_active_loans: u32,
    /// Whether one more borrow would be allowed.
    pub can_borrow: bool,
}

/// Resolves users and builds profiles.
pub struct UserService {
    user_repo: Arc<UserRepository>,
    loan_repo: Arc<LoanRepository>,
    policy: BorrowingPolicy,
    clock: Arc<dyn Clock>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        loan_repo: Arc<LoanRepository>,
        policy: BorrowingPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repo,
            loan_repo,
            policy,
            clock,
        }
    }

    /// Load a user by id.
    pub async fn find(&self, id: UserId) -> AppResult<Option<User>> {
        self.user_repo.find_by_id(id).await
    }

    /// Register a user. Account creation sits behind the gateway; this is
    /// used for provisioning and tests.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        if data.email.trim().is_empty() {
            return Err(ValidationErrors::single("email", "can't be blank").into());
        }
        self.user_repo.create(data).await
    }

    /// The acting user's profile.
    pub async fn profile(&self, ctx: &RequestContext) -> AppResult<UserProfile> {
        let now = self.clock.now();
        let (active, overdue) = self.loan_repo.counts_for_user(ctx.user_id(), now).await?;
        let borrower = Borrower::new(ctx.user.clone(), u32::try_from(active).unwrap_or(u32::MAX));

        Ok(UserProfile {
            can_borrow: borrower.can_borrow_book(&self.policy),
            user: borrower.user,
            active_loans: active,
            overdue_loans: overdue,
            max_active_loans: self.policy.max_active_loans,
        })
    }

    /// The instant services consider "now".
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }
}
