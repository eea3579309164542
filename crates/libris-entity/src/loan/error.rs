//! Loan lifecycle failures.

use chrono::{DateTime, Utc};
use thiserror::Error;

use libris_core::error::{AppError, ErrorKind};
use libris_core::types::{BookId, LoanId, ValidationErrors};

/// Every expected way a borrow or return can be refused.
///
/// None of these are faults: they are data-driven outcomes that the
/// caller turns into a user-facing message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoanError {
    /// The user already holds the maximum number of active loans.
    #[error("You have reached the maximum number of borrowed books ({limit}).")]
    BorrowLimitExceeded {
        /// The policy maximum.
        limit: u32,
    },

    /// The book is out on loan.
    #[error("This book is not available for borrowing.")]
    BookUnavailable {
        /// The book that was requested.
        book_id: BookId,
    },

    /// A date or other field rule was broken.
    #[error("{0}")]
    ValidationFailed(ValidationErrors),

    /// No loan was supplied or it does not exist.
    #[error("Loan not found")]
    LoanNotFound,

    /// The book has no unreturned loan to close.
    #[error("No active loan found")]
    NoActiveLoan {
        /// The book whose loan was requested.
        book_id: BookId,
    },

    /// The loan was already closed.
    #[error("This loan has already been returned.")]
    AlreadyReturned {
        /// The loan.
        loan_id: LoanId,
        /// When it was returned.
        returned_at: DateTime<Utc>,
    },
}

impl LoanError {
    /// The kind this failure maps to at the application boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BorrowLimitExceeded { .. }
            | Self::BookUnavailable { .. }
            | Self::ValidationFailed(_) => ErrorKind::Unprocessable,
            Self::LoanNotFound | Self::NoActiveLoan { .. } | Self::AlreadyReturned { .. } => {
                ErrorKind::NotFound
            }
        }
    }
}

impl From<ValidationErrors> for LoanError {
    fn from(errors: ValidationErrors) -> Self {
        Self::ValidationFailed(errors)
    }
}

impl From<LoanError> for AppError {
    fn from(err: LoanError) -> Self {
        let details = match &err {
            LoanError::BorrowLimitExceeded { limit } => {
                Some(serde_json::json!({ "limit": limit }))
            }
            LoanError::BookUnavailable { book_id } => {
                Some(serde_json::json!({ "book_id": book_id }))
            }
            LoanError::ValidationFailed(errors) => serde_json::to_value(errors).ok(),
            LoanError::NoActiveLoan { book_id } => {
                Some(serde_json::json!({ "book_id": book_id }))
            }
            LoanError::AlreadyReturned {
                loan_id,
                returned_at,
            } => Some(serde_json::json!({ "loan_id": loan_id, "returned_at": returned_at })),
            LoanError::LoanNotFound => None,
        };

        let app = AppError::new(err.kind(), err.to_string());
        match details {
            Some(details) => app.with_details(details),
            None => app,
        }
    }
}
