//! A user together with their current lending standing.

use serde::{Deserialize, Serialize};

use crate::loan::policy::BorrowingPolicy;

use super::model::User;

/// A user as seen by the borrowing rules: who they are and how many
/// loans they currently hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Borrower {
    /// The account.
    pub user: User,
    /// Number of loans with no `returned_at`.
    pub active_loan_count: u32,
}

impl Borrower {
    /// Pair a user with their active loan count.
    pub fn new(user: User, active_loan_count: u32) -> Self {
        Self {
            user,
            active_loan_count,
        }
    }

    /// Number of loans the user has not yet returned.
    pub fn active_loan_count(&self) -> u32 {
        self.active_loan_count
    }

    /// Whether another loan would stay within the policy maximum.
    pub fn can_borrow_book(&self, policy: &BorrowingPolicy) -> bool {
        policy.can_borrow(self.active_loan_count)
    }
}
