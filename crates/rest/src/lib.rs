//! # marquee-rest - Movie Catalog HTTP API
//!
//! The HTTP surface of the Marquee movie catalog. Handlers talk to any
//! [`MovieStorage`](marquee_persistence::core::MovieStorage) implementation;
//! in production that is the swappable active storage handle, which hides
//! whether requests are served by PostgreSQL, MongoDB, both with failover,
//! or memory.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use marquee_persistence::backends::memory::MemoryStorage;
//! use marquee_rest::{ServerConfig, create_app_with_config};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let config = ServerConfig::default();
//!     let app = create_app_with_config(MemoryStorage::new(), config.clone());
//!
//!     let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
//!     axum::serve(listener, app).await
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Interaction | HTTP Method | URL Pattern |
//! |------------|-------------|-------------|
//! | create | POST | `/api/movies` |
//! | list | GET | `/api/movies?page=&limit=` |
//! | read | GET | `/api/movies/{id}` |
//! | update | PUT | `/api/movies/{id}` |
//! | delete | DELETE | `/api/movies/{id}` |
//! | health | GET | `/health` |
//! | liveness | GET | `/_liveness` |
//!
//! ## Error Handling
//!
//! Errors are JSON bodies `{ error, errorCode, details?, timestamp }`; see
//! [`error`] for the status code mapping.
//!
//! ## Architecture
//!
//! - [`error`] - Error types and response bodies
//! - [`config`] - Server configuration
//! - [`state`] - Application state (storage, configuration)
//! - [`handlers`] - HTTP request handlers
//! - [`extractors`] - Pagination, id and body extractors
//! - [`responses`] - Success response bodies
//! - [`routing`] - Route configuration

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod responses;
pub mod routing;
pub mod state;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{RestError, RestResult};
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use marquee_persistence::core::MovieStorage;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application with default configuration.
///
/// For more control, use [`create_app_with_config`].
pub fn create_app<S>(storage: S) -> Router
where
    S: MovieStorage + Send + Sync + 'static,
{
    create_app_with_config(storage, ServerConfig::default())
}

/// Creates the Axum application with custom configuration.
///
/// Sets up the movie routes plus request tracing, the request timeout and,
/// when enabled, CORS.
///
/// # Example
///
/// ```rust
/// use marquee_persistence::backends::memory::MemoryStorage;
/// use marquee_rest::{ServerConfig, create_app_with_config};
///
/// let config = ServerConfig {
///     enable_cors: false,
///     ..Default::default()
/// };
/// let app = create_app_with_config(MemoryStorage::new(), config);
/// ```
pub fn create_app_with_config<S>(storage: S, config: ServerConfig) -> Router
where
    S: MovieStorage + Send + Sync + 'static,
{
    info!(
        backend = storage.backend_name(),
        "Creating REST API server"
    );

    let state = AppState::new(Arc::new(storage), config.clone());
    let router = routing::create_routes(state);

    // Build middleware stack
    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    router.layer(service_builder)
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        let methods: Vec<_> = config
            .cors_methods
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_methods(methods);
    }

    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<_> = config
            .cors_headers
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_headers(headers);
    }

    cors
}

/// Initializes the tracing subscriber for logging.
///
/// Call once at startup. `RUST_LOG` takes precedence over `level`.
///
/// # Arguments
///
/// * `level` - The log level (error, warn, info, debug, trace)
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "marquee={level},marquee_rest={level},marquee_persistence={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
