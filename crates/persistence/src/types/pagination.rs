//! Offset pagination for catalog listings.

use serde::Serialize;

use super::Movie;

/// A page request. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// The requested page, starting at 1.
    pub page: u32,
    /// Maximum number of records on the page.
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

impl PageRequest {
    /// Creates a page request, clamping `page` and `limit` to at least 1.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Number of records to skip: `(page - 1) * limit`.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// One page of records plus the total number of records in the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MoviePage {
    /// The records on this page.
    pub data: Vec<Movie>,
    /// Number of records in the whole store.
    pub total: u64,
}

impl MoviePage {
    /// Creates a page.
    pub fn new(data: Vec<Movie>, total: u64) -> Self {
        Self { data, total }
    }

    /// Total number of pages for the given page size.
    pub fn total_pages(&self, limit: u32) -> u64 {
        if limit == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(limit))
    }
}
