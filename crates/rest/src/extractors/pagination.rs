//! Pagination extractor.

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use marquee_persistence::core::MovieStorage;
use marquee_persistence::types::PageRequest;
use serde::Deserialize;

use crate::state::AppState;

/// Axum extractor for `page` and `limit`.
///
/// Never rejects: unparsable or zero values fall back to the defaults,
/// a negative `page` becomes 1 and `limit` is clamped to the configured
/// maximum page size.
///
/// # Example
///
/// ```rust,ignore
/// use marquee_rest::extractors::Pagination;
///
/// async fn list_handler(pagination: Pagination) {
///     let request = pagination.page_request();
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

/// Query parameters kept as text so that bad numbers degrade to defaults.
#[derive(Debug, Deserialize)]
struct PaginationQuery {
    page: Option<String>,
    limit: Option<String>,
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|value| *value != 0)
}

impl Pagination {
    /// Resolves raw query values against the configured page sizes.
    pub fn resolve(
        page: Option<&str>,
        limit: Option<&str>,
        default_limit: u32,
        max_limit: u32,
    ) -> Self {
        let max_limit = max_limit.max(1);
        let page = parse_positive(page).unwrap_or(1).clamp(1, i64::from(u32::MAX));
        let limit = parse_positive(limit)
            .unwrap_or(i64::from(default_limit))
            .clamp(1, i64::from(max_limit));

        // Both values are clamped into u32 range above.
        Self {
            page: u32::try_from(page).unwrap_or(1),
            limit: u32::try_from(limit).unwrap_or(max_limit),
        }
    }

    /// The 1-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// The page size.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// The storage-level request.
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

impl<S> FromRequestParts<AppState<S>> for Pagination
where
    S: MovieStorage + Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let query = Query::<PaginationQuery>::from_request_parts(parts, state)
            .await
            .map(|Query(query)| query)
            .unwrap_or(PaginationQuery {
                page: None,
                limit: None,
            });

        Ok(Pagination::resolve(
            query.page.as_deref(),
            query.limit.as_deref(),
            state.default_page_size(),
            state.max_page_size(),
        ))
    }
}
