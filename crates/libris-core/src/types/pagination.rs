//! Page windows for list endpoints.
//!
//! Pages are 1-based. Sizes are clamped to `1..=MAX_PER_PAGE` so a query
//! string can never ask the database for an unbounded result set.

use serde::{Deserialize, Serialize};

/// Page size when the caller does not choose one.
pub const DEFAULT_PER_PAGE: u64 = 25;
/// Largest page size a caller may request.
pub const MAX_PER_PAGE: u64 = 100;

/// Which slice of a result set to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number, starting at 1.
    pub page: u64,
    /// Rows per page.
    pub page_size: u64,
}

impl PageRequest {
    /// A clamped page request.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PER_PAGE),
        }
    }

    /// SQL `LIMIT`, ready to bind.
    pub fn limit(&self) -> i64 {
        to_sql(self.page_size)
    }

    /// SQL `OFFSET`, ready to bind.
    pub fn offset(&self) -> i64 {
        to_sql((self.page - 1).saturating_mul(self.page_size))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }
}

fn to_sql(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// One page of results plus the totals a client needs to page through them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T: Serialize> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// Page number, starting at 1.
    pub page: u64,
    /// Requested rows per page.
    pub page_size: u64,
    /// Matching rows across all pages.
    pub total_items: u64,
    /// At least 1, even for an empty result.
    pub total_pages: u64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_previous: bool,
}

impl<T: Serialize> PageResponse<T> {
    /// Wrap the rows fetched for `request`, given the `COUNT(*)` of all matches.
    pub fn new(items: Vec<T>, request: &PageRequest, total: i64) -> Self {
        let total_items = u64::try_from(total).unwrap_or(0);
        let total_pages = total_items.div_ceil(request.page_size).max(1);
        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total_items,
            total_pages,
            has_next: request.page < total_pages,
            has_previous: request.page > 1,
        }
    }

    /// Transform the rows, keeping the page metadata.
    pub fn map<U: Serialize>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}
