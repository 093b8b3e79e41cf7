//! HTTP request handlers.
//!
//! - [`movies`] - create, list, read, update and delete catalog entries
//! - [`health`] - health check endpoints

pub mod health;
pub mod movies;

// Re-export handlers for convenience
pub use health::{health_handler, liveness_handler};
pub use movies::{
    create_movie_handler, delete_movie_handler, get_movie_handler, list_movies_handler,
    update_movie_handler,
};
