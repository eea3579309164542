//! User domain entities.

pub mod borrower;
pub mod model;
pub mod role;

pub use borrower::Borrower;
pub use model::{CreateUser, User};
pub use role::UserRole;
