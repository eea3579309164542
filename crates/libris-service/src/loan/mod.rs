//! Loan lifecycle: borrow, return, and loan listings.

pub mod service;
pub mod view;

pub use service::LoanService;
pub use view::LoanView;
