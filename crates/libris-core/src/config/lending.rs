//! Borrowing policy configuration.

use serde::{Deserialize, Serialize};

/// Default cap on concurrently active loans per user.
pub const DEFAULT_MAX_ACTIVE_LOANS: u32 = 5;
/// Default loan length in days.
pub const DEFAULT_LOAN_DURATION_DAYS: i64 = 14;

/// The `[lending]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LendingConfig {
    /// Maximum number of active loans a user may hold.
    #[serde(default = "default_max_active_loans")]
    pub max_active_loans: u32,
    /// Loan duration applied when the borrower does not request a due date.
    #[serde(default = "default_loan_duration_days")]
    pub loan_duration_days: i64,
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            max_active_loans: DEFAULT_MAX_ACTIVE_LOANS,
            loan_duration_days: DEFAULT_LOAN_DURATION_DAYS,
        }
    }
}

fn default_max_active_loans() -> u32 {
    DEFAULT_MAX_ACTIVE_LOANS
}

fn default_loan_duration_days() -> i64 {
    DEFAULT_LOAN_DURATION_DAYS
}
