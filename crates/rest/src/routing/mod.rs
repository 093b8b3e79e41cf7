//! Route configuration for the movie catalog API.

pub mod movie_routes;

pub use movie_routes::create_routes;
