//! Movie catalog route configuration.

use axum::{Router, routing::get};
use marquee_persistence::core::MovieStorage;

use crate::handlers;
use crate::state::AppState;

/// Creates all API routes.
///
/// # Routes
///
/// ## System-level
/// - `GET /health` - Storage status
/// - `GET /_liveness` - Liveness probe
///
/// ## Catalog
/// - `GET /api/movies` - Paged listing
/// - `POST /api/movies` - Create
/// - `GET /api/movies/{id}` - Read
/// - `PUT /api/movies/{id}` - Partial update
/// - `DELETE /api/movies/{id}` - Delete
pub fn create_routes<S>(state: AppState<S>) -> Router
where
    S: MovieStorage + Send + Sync + 'static,
{
    Router::new()
        // System-level routes
        .route("/health", get(handlers::health_handler::<S>))
        .route("/_liveness", get(handlers::liveness_handler))
        // Catalog routes
        .route(
            "/api/movies",
            get(handlers::list_movies_handler::<S>).post(handlers::create_movie_handler::<S>),
        )
        .route(
            "/api/movies/{id}",
            get(handlers::get_movie_handler::<S>)
                .put(handlers::update_movie_handler::<S>)
                .delete(handlers::delete_movie_handler::<S>),
        )
        // State
        .with_state(state)
}
