//! Repository implementations for all Libris tables.

pub mod author;
pub mod book;
pub mod category;
pub mod loan;
pub mod user;

pub use author::AuthorRepository;
pub use book::{BookRepository, DeleteOutcome};
pub use category::CategoryRepository;
pub use loan::{LoanCounts, LoanListQuery, LoanRepository, LoanTransaction};
pub use user::UserRepository;
