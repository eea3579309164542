//! Loan domain entities and the borrowing rules.

pub mod error;
pub mod model;
pub mod policy;
pub mod status;

pub use error::LoanError;
pub use model::{Loan, LoanDetails, NewLoan};
pub use policy::BorrowingPolicy;
pub use status::LoanStatus;
