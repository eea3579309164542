//! Core type definitions used across the Libris workspace.

pub mod id;
pub mod pagination;
pub mod validation;

pub use id::*;
pub use pagination::{PageRequest, PageResponse};
pub use validation::ValidationErrors;
