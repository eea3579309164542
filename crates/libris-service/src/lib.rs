//! # libris-service
//!
//! Business logic for Libris. [`LoanService`] owns the loan lifecycle:
//! borrow and return run inside one database transaction each, consult
//! the [`BorrowingPolicy`](libris_entity::loan::BorrowingPolicy), and flip
//! the book's availability flag alongside the loan row. The remaining
//! services cover the catalogue, the dashboard and user profiles.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod author;
pub mod book;
pub mod category;
pub mod context;
pub mod dashboard;
pub mod loan;
pub mod user;

pub use author::AuthorService;
pub use book::BookService;
pub use category::CategoryService;
pub use context::RequestContext;
pub use dashboard::DashboardService;
pub use loan::{LoanService, LoanView};
pub use user::UserService;
