//! Health check endpoint handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{SecondsFormat, Utc};
use marquee_persistence::core::{MovieStorage, StorageStatus};
use serde::Serialize;
use tracing::debug;

use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"healthy"`; the server answers even when degraded to memory.
    pub status: &'static str,
    /// The serving backend and, for the failover coordinator, its flags.
    #[serde(flatten)]
    pub storage: StorageStatus,
    /// ISO-8601 time of the check.
    pub timestamp: String,
}

/// Handler for the health check endpoint.
///
/// Reports which backend is serving requests. For a primary/replica setup
/// it also reports the coordinator's availability flags.
///
/// # HTTP Request
///
/// `GET [base]/health`
///
/// # Response
///
/// - `200 OK` - always
pub async fn health_handler<S>(State(state): State<AppState<S>>) -> Json<HealthResponse>
where
    S: MovieStorage + Send + Sync,
{
    debug!("Processing health check request");

    Json(HealthResponse {
        status: "healthy",
        storage: state.storage().status(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Handler for a liveness probe.
///
/// # HTTP Request
///
/// `GET [base]/_liveness`
pub async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}
