//! Loan status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The read-time status of a loan.
///
/// Only `returned` is backed by stored state (`returned_at`). `overdue` is
/// derived from the due date and the current instant and is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// Out on loan and within its due date.
    Active,
    /// Out on loan past its due date.
    Overdue,
    /// Given back. Terminal.
    Returned,
}

impl LoanStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Overdue => "overdue",
            Self::Returned => "returned",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LoanStatus {
    type Err = libris_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "overdue" => Ok(Self::Overdue),
            "returned" => Ok(Self::Returned),
            _ => Err(libris_core::AppError::validation(format!(
                "Invalid loan filter: '{s}'. Expected one of: active, returned, overdue"
            ))),
        }
    }
}
