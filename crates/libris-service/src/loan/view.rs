//! Read-time presentation of a loan.

use chrono::{DateTime, Utc};
use serde::Serialize;

use libris_entity::loan::{Loan, LoanDetails, LoanStatus};

/// A loan with its status and overdue days resolved at a given instant.
#[derive(Debug, Clone, Serialize)]
pub struct LoanView {
    /// The loan and its joined names.
    #[serde(flatten)]
    pub details: LoanDetails,
    /// Status at `as_of`.
    pub status: LoanStatus,
    /// Whole days past due at `as_of`; 0 unless overdue.
    pub days_overdue: i64,
}

impl LoanView {
    /// Resolve the derived fields at `now`.
    pub fn at(details: LoanDetails, now: DateTime<Utc>) -> Self {
        let status = details.loan.status(now);
        let days_overdue = details.loan.days_overdue(now);
        Self {
            details,
            status,
            days_overdue,
        }
    }

    /// The underlying loan row.
    pub fn loan(&self) -> &Loan {
        &self.details.loan
    }
}
