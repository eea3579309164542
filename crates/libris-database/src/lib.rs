//! # libris-database
//!
//! PostgreSQL connection management, the embedded migrator, and the
//! repositories for every Libris table. Loan transitions run through
//! [`repositories::loan::LoanTransaction`], which holds row locks for the
//! lifetime of one borrow or return.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
