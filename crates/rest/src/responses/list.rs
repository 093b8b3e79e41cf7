//! Paged listing body.

use marquee_persistence::types::{Movie, MoviePage};
use serde::Serialize;

use crate::extractors::Pagination;

/// Body of `GET /api/movies`.
#[derive(Debug, Serialize)]
pub struct MovieListResponse {
    /// The records on the requested page.
    pub data: Vec<Movie>,
    /// Where this page sits in the whole listing.
    pub pagination: PaginationMeta,
}

/// Pagination metadata for a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// The 1-based page number that was served.
    pub current_page: u32,
    /// The page size that was applied.
    pub page_size: u32,
    /// Number of records in the whole store.
    pub total_records: u64,
    /// `ceil(total_records / page_size)`.
    pub total_pages: u64,
    /// Whether `current_page < total_pages`.
    pub has_next_page: bool,
}

impl MovieListResponse {
    /// Builds the body for `page` fetched with `pagination`.
    pub fn new(page: MoviePage, pagination: &Pagination) -> Self {
        let total_pages = page.total_pages(pagination.limit());
        Self {
            pagination: PaginationMeta {
                current_page: pagination.page(),
                page_size: pagination.limit(),
                total_records: page.total,
                total_pages,
                has_next_page: u64::from(pagination.page()) < total_pages,
            },
            data: page.data,
        }
    }
}
