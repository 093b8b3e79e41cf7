//! Axum extractors for the movie routes.
//!
//! - [`Pagination`] - `page`/`limit` query parameters
//! - [`MovieId`] - the integer `{id}` path segment
//! - [`JsonBody`] - a raw JSON body, validated later by the handler

mod json_body;
mod movie_id;
mod pagination;

pub use json_body::JsonBody;
pub use movie_id::MovieId;
pub use pagination::Pagination;
