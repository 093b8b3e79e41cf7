//! Movie id path extractor.

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::RestError;

/// The `{id}` path segment parsed as an integer.
///
/// Rejects with `400 INVALID_ID` when the segment is not an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovieId(pub i64);

impl MovieId {
    /// Parses a raw path segment.
    pub fn parse(raw: &str) -> Result<Self, RestError> {
        raw.trim()
            .parse::<i64>()
            .map(MovieId)
            .map_err(|_| RestError::InvalidId)
    }
}

impl<S> FromRequestParts<S> for MovieId
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| RestError::InvalidId)?;
        MovieId::parse(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer() {
        assert_eq!(MovieId::parse("42").unwrap(), MovieId(42));
        assert_eq!(MovieId::parse("-3").unwrap(), MovieId(-3));
    }

    #[test]
    fn test_parse_rejects_non_integer() {
        assert!(matches!(MovieId::parse("abc"), Err(RestError::InvalidId)));
        assert!(matches!(MovieId::parse("1.5"), Err(RestError::InvalidId)));
        assert!(matches!(MovieId::parse(""), Err(RestError::InvalidId)));
    }
}
