//! Error types for the movie catalog API.
//!
//! Every error is rendered as a JSON body:
//!
//! ```json
//! { "error": "Movie not found", "errorCode": "NOT_FOUND", "timestamp": "2024-05-01T12:00:00.000Z" }
//! ```
//!
//! # Error Mapping
//!
//! | Error | HTTP Status | `errorCode` |
//! |-------|-------------|-------------|
//! | Validation / malformed JSON | 400 | `VALIDATION_ERROR` |
//! | Non-integer id | 400 | `INVALID_ID` |
//! | Absent record | 404 | `NOT_FOUND` |
//! | Backend unavailable | 503 | `DATABASE_ERROR` |
//! | Anything else | 500 | `INTERNAL_ERROR` |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use marquee_persistence::error::{StorageError, ValidationDetail, ValidationError};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::error;

/// The primary error type for API operations.
#[derive(Debug, Error)]
pub enum RestError {
    /// The request body failed validation (HTTP 400).
    #[error("Validation error")]
    Validation {
        /// One entry per failed rule.
        details: Vec<ValidationDetail>,
    },

    /// The path id is not an integer (HTTP 400).
    #[error("Invalid movie ID")]
    InvalidId,

    /// No record with the requested id (HTTP 404).
    #[error("Movie not found")]
    NotFound,

    /// The storage backend could not be reached (HTTP 503).
    #[error("Database is not connected")]
    DatabaseUnavailable {
        /// The backend's own error message.
        message: String,
    },

    /// Any other failure (HTTP 500). The message is only logged.
    #[error("Failed to {operation}")]
    Internal {
        /// What the handler was doing, e.g. `"create movie"`.
        operation: &'static str,
        /// The underlying error message.
        message: String,
    },
}

impl RestError {
    /// A body that is not JSON at all.
    pub fn malformed_json(message: impl std::fmt::Display) -> Self {
        RestError::Validation {
            details: vec![ValidationDetail {
                path: Vec::new(),
                message: format!("Malformed JSON: {}", message),
            }],
        }
    }

    /// Maps a storage failure that happened while performing `operation`.
    pub fn storage(operation: &'static str, err: StorageError) -> Self {
        match err {
            StorageError::Validation(e) => e.into(),
            e if e.is_unavailable() => {
                error!(operation, error = %e, "Storage backend unavailable");
                RestError::DatabaseUnavailable {
                    message: e.to_string(),
                }
            }
            e => {
                error!(operation, error = %e, "Storage operation failed");
                RestError::Internal {
                    operation,
                    message: e.to_string(),
                }
            }
        }
    }

    /// The HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::Validation { .. } | RestError::InvalidId => StatusCode::BAD_REQUEST,
            RestError::NotFound => StatusCode::NOT_FOUND,
            RestError::DatabaseUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            RestError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The machine-readable `errorCode`.
    pub fn error_code(&self) -> &'static str {
        match self {
            RestError::Validation { .. } => "VALIDATION_ERROR",
            RestError::InvalidId => "INVALID_ID",
            RestError::NotFound => "NOT_FOUND",
            RestError::DatabaseUnavailable { .. } => "DATABASE_ERROR",
            RestError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            RestError::Validation { details } => serde_json::to_value(details).ok(),
            RestError::DatabaseUnavailable { message } => Some(Value::String(message.clone())),
            _ => None,
        }
    }
}

/// The JSON error body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Human-readable summary.
    pub error: String,
    /// Machine-readable code.
    pub error_code: &'static str,
    /// Validation issues or the backend message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// ISO-8601 time the error was produced.
    pub timestamp: String,
}

impl From<&RestError> for ErrorBody {
    fn from(err: &RestError) -> Self {
        Self {
            error: err.to_string(),
            error_code: err.error_code(),
            details: err.details(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let body = ErrorBody::from(&self);
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<ValidationError> for RestError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidMovie { details, .. } => RestError::Validation { details },
        }
    }
}

/// Result type alias for API operations.
pub type RestResult<T> = Result<T, RestError>;

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_persistence::error::BackendError;

    fn unavailable() -> StorageError {
        StorageError::Backend(BackendError::Unavailable {
            backend_name: "postgres".to_string(),
            message: "PostgreSQL database is not connected".to_string(),
        })
    }

    #[test]
    fn test_display() {
        assert_eq!(RestError::NotFound.to_string(), "Movie not found");
        assert_eq!(RestError::InvalidId.to_string(), "Invalid movie ID");
        let err = RestError::Internal {
            operation: "delete movie",
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to delete movie");
    }

    #[test]
    fn test_unavailable_maps_to_database_error() {
        let err = RestError::storage("fetch movies", unavailable());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_code(), "DATABASE_ERROR");

        let body = ErrorBody::from(&err);
        assert_eq!(body.error, "Database is not connected");
        assert!(body.details.unwrap().as_str().unwrap().contains("not connected"));
    }

    #[test]
    fn test_query_error_maps_to_internal() {
        let err = RestError::storage(
            "fetch movie",
            StorageError::Backend(BackendError::QueryError {
                message: "syntax error".to_string(),
            }),
        );
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        // The underlying message stays server-side.
        let body = serde_json::to_value(ErrorBody::from(&err)).unwrap();
        assert_eq!(body["error"], "Failed to fetch movie");
        assert_eq!(body["errorCode"], "INTERNAL_ERROR");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn test_validation_body() {
        let err: RestError = ValidationError::InvalidMovie {
            message: "Title is required".to_string(),
            details: vec![ValidationDetail::field("title", "Title is required")],
        }
        .into();
        let body = serde_json::to_value(ErrorBody::from(&err)).unwrap();
        assert_eq!(body["error"], "Validation error");
        assert_eq!(body["errorCode"], "VALIDATION_ERROR");
        assert_eq!(body["details"][0]["path"][0], "title");
        assert_eq!(body["details"][0]["message"], "Title is required");
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_malformed_json_has_empty_path() {
        let err = RestError::malformed_json("expected value at line 1 column 1");
        let body = serde_json::to_value(ErrorBody::from(&err)).unwrap();
        assert_eq!(body["errorCode"], "VALIDATION_ERROR");
        assert_eq!(body["details"][0]["path"], serde_json::json!([]));
    }
}
