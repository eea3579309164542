//! The borrowing rules: how many loans a user may hold, how long a loan
//! runs, and which due dates are acceptable.
//!
//! Everything here is pure. The current instant is always an argument.

use chrono::{DateTime, Duration, Utc};

use libris_core::config::LendingConfig;
use libris_core::config::lending::{DEFAULT_LOAN_DURATION_DAYS, DEFAULT_MAX_ACTIVE_LOANS};
use libris_core::error::AppError;
use libris_core::result::AppResult;
use libris_core::types::ValidationErrors;

use crate::book::Book;

use super::error::LoanError;

/// Maximum number of unreturned loans a single user may hold.
pub const MAX_ACTIVE_LOANS_PER_USER: u32 = DEFAULT_MAX_ACTIVE_LOANS;

/// Longest loan length the configuration may set.
pub const MAX_LOAN_DURATION_DAYS: i64 = 3650;

/// Loan length used when the borrower does not ask for a due date.
pub fn default_loan_duration() -> Duration {
    Duration::days(DEFAULT_LOAN_DURATION_DAYS)
}

/// Immutable lending limits, built once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorrowingPolicy {
    /// Maximum concurrent active loans per user.
    pub max_active_loans: u32,
    /// Default loan length.
    pub loan_duration: Duration,
}

impl Default for BorrowingPolicy {
    fn default() -> Self {
        Self {
            max_active_loans: MAX_ACTIVE_LOANS_PER_USER,
            loan_duration: default_loan_duration(),
        }
    }
}

impl BorrowingPolicy {
    /// Build the policy from the `[lending]` configuration section.
    pub fn from_config(config: &LendingConfig) -> AppResult<Self> {
        if config.max_active_loans == 0 {
            return Err(AppError::configuration(
                "lending.max_active_loans must be greater than zero",
            ));
        }
        if config.loan_duration_days <= 0 {
            return Err(AppError::configuration(
                "lending.loan_duration_days must be greater than zero",
            ));
        }
        let loan_duration = Duration::try_days(config.loan_duration_days)
            .filter(|_| config.loan_duration_days <= MAX_LOAN_DURATION_DAYS)
            .ok_or_else(|| {
                AppError::configuration(format!(
                    "lending.loan_duration_days must be at most {MAX_LOAN_DURATION_DAYS}"
                ))
            })?;

        Ok(Self {
            max_active_loans: config.max_active_loans,
            loan_duration,
        })
    }

    /// Whether a user holding `active_loan_count` loans may take another.
    pub fn can_borrow(&self, active_loan_count: u32) -> bool {
        active_loan_count < self.max_active_loans
    }

    /// Check both borrow preconditions. The limit is checked first, so a
    /// user at the limit asking for an unavailable book sees the limit error.
    pub fn check_borrow(&self, active_loan_count: u32, book: &Book) -> Result<(), LoanError> {
        if !self.can_borrow(active_loan_count) {
            return Err(LoanError::BorrowLimitExceeded {
                limit: self.max_active_loans,
            });
        }
        if !book.available {
            return Err(LoanError::BookUnavailable { book_id: book.id });
        }
        Ok(())
    }

    /// The due date for a loan starting at `borrowed_at`.
    ///
    /// A default due date past the representable calendar is a
    /// `due_date` validation failure.
    pub fn due_date(
        &self,
        borrowed_at: DateTime<Utc>,
        requested: Option<DateTime<Utc>>,
    ) -> Result<DateTime<Utc>, LoanError> {
        if let Some(requested) = requested {
            return Ok(requested);
        }
        borrowed_at
            .checked_add_signed(self.loan_duration)
            .ok_or_else(|| {
                LoanError::ValidationFailed(ValidationErrors::single(
                    "due_date",
                    "is out of range",
                ))
            })
    }
}

/// Reject a due date that is not strictly after the borrow instant.
pub fn validate_due_date(
    borrowed_at: DateTime<Utc>,
    due_date: DateTime<Utc>,
) -> Result<(), ValidationErrors> {
    if due_date <= borrowed_at {
        return Err(ValidationErrors::single(
            "due_date",
            "must be after borrowed date",
        ));
    }
    Ok(())
}

/// A loan is overdue while it is unreturned and its due date has passed.
pub fn is_overdue(
    returned_at: Option<DateTime<Utc>>,
    due_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    returned_at.is_none() && due_date < now
}
