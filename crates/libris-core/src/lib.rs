//! # libris-core
//!
//! Core crate for Libris. Contains configuration schemas, typed
//! identifiers, pagination and validation types, the clock abstraction,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other Libris crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
