//! HTTP handlers, one module per resource.

pub mod author;
pub mod book;
pub mod category;
pub mod dashboard;
pub mod health;
pub mod loan;
pub mod user;

use libris_core::types::PageRequest;

use crate::extractors::PaginationParams;

/// Build a clamped page request from optional query values.
pub(crate) fn page_from(page: Option<u64>, per_page: Option<u64>) -> PageRequest {
    let defaults = PaginationParams::default();
    PaginationParams {
        page: page.unwrap_or(defaults.page),
        per_page: per_page.unwrap_or(defaults.per_page),
    }
    .into_page_request()
}
