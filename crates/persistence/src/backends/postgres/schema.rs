//! PostgreSQL schema definitions.

use crate::error::{BackendError, StorageError, StorageResult};

/// DDL for the catalog table. Column limits match the validation rules.
pub const CREATE_MOVIES_TABLE: &str = "
CREATE TABLE IF NOT EXISTS movies (
    id BIGSERIAL PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    type VARCHAR(20) NOT NULL,
    director VARCHAR(255) NOT NULL,
    budget NUMERIC(10, 2),
    location VARCHAR(500),
    duration INTEGER,
    year INTEGER NOT NULL,
    additional_details TEXT,
    created_at TIMESTAMPTZ(3) NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ(3) NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_movies_created_at ON movies (created_at DESC);
";

/// Initialize the database schema.
pub async fn initialize_schema(client: &deadpool_postgres::Client) -> StorageResult<()> {
    client
        .batch_execute(CREATE_MOVIES_TABLE)
        .await
        .map_err(|e| pg_error(format!("Failed to create movies table: {}", e)))
}

fn pg_error(message: String) -> StorageError {
    StorageError::Backend(BackendError::Internal {
        backend_name: "postgres".to_string(),
        message,
        source: None,
    })
}
