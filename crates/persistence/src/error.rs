//! Error types for the persistence layer.
//!
//! Adapters raise [`StorageError`]s; the failover coordinator turns backend
//! failures into availability flag flips, so in multi-backend setups only
//! validation errors are expected to reach the HTTP layer.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use serde::Serialize;
use thiserror::Error;

/// The primary error type for all storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl StorageError {
    /// Returns true when the error means the backend could not be reached at all.
    ///
    /// These surface as `503 DATABASE_ERROR`; everything else in the backend
    /// category is an internal error.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StorageError::Backend(
                BackendError::Unavailable { .. } | BackendError::ConnectionFailed { .. }
            )
        )
    }
}

/// Errors related to movie input validation.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The movie payload failed schema validation.
    #[error("invalid movie: {message}")]
    InvalidMovie {
        message: String,
        details: Vec<ValidationDetail>,
    },
}

impl ValidationError {
    /// The per-field issues carried by this error.
    pub fn details(&self) -> &[ValidationDetail] {
        match self {
            ValidationError::InvalidMovie { details, .. } => details,
        }
    }
}

/// A single failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDetail {
    /// Path of the offending field, e.g. `["duration"]`. Empty for the whole body.
    pub path: Vec<String>,
    /// A human-readable error message.
    pub message: String,
}

impl ValidationDetail {
    /// Creates a detail for a top-level field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self {
            path: vec![field.to_string()],
            message: message.into(),
        }
    }
}

/// Errors originating from a database backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend is currently unavailable.
    #[error("backend unavailable: {backend_name}: {message}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution error.
    #[error("query execution failed: {message}")]
    QueryError { message: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Backend(BackendError::SerializationError {
            message: err.to_string(),
        })
    }
}

#[cfg(feature = "postgres")]
impl From<tokio_postgres::Error> for StorageError {
    fn from(err: tokio_postgres::Error) -> Self {
        StorageError::Backend(BackendError::Internal {
            backend_name: "postgres".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        })
    }
}

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for StorageError {
    fn from(err: mongodb::error::Error) -> Self {
        StorageError::Backend(BackendError::Internal {
            backend_name: "mongodb".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        })
    }
}
