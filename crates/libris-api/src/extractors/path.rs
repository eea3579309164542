//! Typed path parameter helpers.

use std::str::FromStr;

use libris_core::error::AppError;

/// Parse a typed id from a path segment, rejecting malformed values with
/// a 400 instead of a 404.
pub fn parse_id<T: FromStr>(raw: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::validation(format!("Invalid id: {raw}")))
}
