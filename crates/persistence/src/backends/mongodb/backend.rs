//! MongoDB backend implementation.

use std::fmt::Debug;
use std::time::Duration;

use mongodb::bson::{Document, doc};
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::info;

use crate::error::{BackendError, StorageError, StorageResult};

/// Collection holding catalog records.
pub const MOVIES_COLLECTION: &str = "movies";
/// Collection holding the id sequence document.
pub const COUNTERS_COLLECTION: &str = "counters";
/// `_id` of the sequence document in [`COUNTERS_COLLECTION`].
pub const MOVIES_COUNTER_ID: &str = "movies";

/// Configuration for the MongoDB backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    /// Connection URI (`mongodb://` or `mongodb+srv://`).
    pub uri: String,

    /// Database name.
    #[serde(default = "default_database")]
    pub database: String,

    /// How long to wait for a reachable server before an operation fails.
    #[serde(default = "default_server_selection_timeout", with = "crate::composite::config::humantime_serde")]
    pub server_selection_timeout: Duration,
}

fn default_database() -> String {
    "movie_db".to_string()
}

fn default_server_selection_timeout() -> Duration {
    Duration::from_secs(5)
}

impl MongoConfig {
    /// Creates a configuration for `uri` with the default database name.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: default_database(),
            server_selection_timeout: default_server_selection_timeout(),
        }
    }

    /// Sets the database name.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }
}

/// Returns true if `uri` names a MongoDB deployment.
pub fn is_mongo_uri(uri: &str) -> bool {
    uri.starts_with("mongodb")
}

/// MongoDB replica store.
///
/// The client is created on first use. A failed connection attempt leaves
/// the cell empty so the next call tries again.
pub struct MongoBackend {
    config: MongoConfig,
    database: OnceCell<Database>,
}

impl Debug for MongoBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoBackend")
            .field("database", &self.config.database)
            .field("connected", &self.database.initialized())
            .finish_non_exhaustive()
    }
}

impl MongoBackend {
    /// Creates a backend. No connection is made until the first operation.
    pub fn new(config: MongoConfig) -> Self {
        Self {
            config,
            database: OnceCell::new(),
        }
    }

    /// Returns the backend configuration.
    pub fn config(&self) -> &MongoConfig {
        &self.config
    }

    pub(crate) async fn database(&self) -> StorageResult<&Database> {
        self.database
            .get_or_try_init(|| async {
                let mut options = ClientOptions::parse(&self.config.uri)
                    .await
                    .map_err(|e| mongo_error("Failed to parse MongoDB URI", e))?;
                options.app_name = Some("marquee".to_string());
                options.server_selection_timeout = Some(self.config.server_selection_timeout);

                let client = Client::with_options(options)
                    .map_err(|e| mongo_error("Failed to create MongoDB client", e))?;
                info!(database = %self.config.database, "MongoDB client created");
                Ok(client.database(&self.config.database))
            })
            .await
    }

    pub(crate) async fn movies(&self) -> StorageResult<Collection<Document>> {
        Ok(self.database().await?.collection(MOVIES_COLLECTION))
    }

    pub(crate) async fn counters(&self) -> StorageResult<Collection<Document>> {
        Ok(self.database().await?.collection(COUNTERS_COLLECTION))
    }

    pub(crate) async fn ping(&self) -> StorageResult<()> {
        self.database()
            .await?
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| mongo_error("MongoDB ping failed", e))?;
        Ok(())
    }
}

/// Maps a driver error, treating unreachable servers as connection failures.
pub(crate) fn mongo_error(context: &str, err: mongodb::error::Error) -> StorageError {
    match *err.kind {
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) | ErrorKind::DnsResolve { .. } => {
            StorageError::Backend(BackendError::ConnectionFailed {
                backend_name: "mongodb".to_string(),
                message: format!("{}: {}", context, err),
            })
        }
        _ => StorageError::Backend(BackendError::Internal {
            backend_name: "mongodb".to_string(),
            message: format!("{}: {}", context, err),
            source: Some(Box::new(err)),
        }),
    }
}
