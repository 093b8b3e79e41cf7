//! Core types for the persistence layer.
//!
//! - [`Movie`] - a stored catalog entry
//! - [`NewMovie`], [`MovieUpdate`] - validated create and partial-update inputs
//! - [`PageRequest`], [`MoviePage`] - offset pagination
//! - [`validate_new_movie`], [`validate_movie_update`] - JSON payload validation
//!
//! # Examples
//!
//! ```
//! use marquee_persistence::types::{validate_new_movie, MovieType};
//! use serde_json::json;
//!
//! let input = validate_new_movie(&json!({
//!     "title": "Inception",
//!     "type": "Movie",
//!     "director": "Nolan",
//!     "year": 2010,
//!     "duration": 148
//! }))
//! .unwrap();
//!
//! assert_eq!(input.kind, MovieType::Movie);
//! ```

mod movie;
mod pagination;
mod validation;

pub use movie::{Movie, MovieType, MovieUpdate, NewMovie};
pub use pagination::{MoviePage, PageRequest};
pub use validation::{validate_movie_update, validate_new_movie};
