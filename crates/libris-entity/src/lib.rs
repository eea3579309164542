//! # libris-entity
//!
//! Domain entity models for Libris. Every struct in this crate represents
//! a database table row or a domain value object. Database entities derive
//! `sqlx::FromRow`.
//!
//! The loan lifecycle rules live here as plain functions and methods so
//! they can be exercised without a database: see [`loan::policy`] and
//! [`loan::Loan`].

pub mod author;
pub mod book;
pub mod category;
pub mod loan;
pub mod user;
