//! Startup choice of storage variant.
//!
//! [`choose_storage`] is the pure decision over [`StorageSettings`];
//! [`build_storage`] constructs the chosen backends.

use std::sync::Arc;

use tracing::{error, info};

use crate::backends::memory::MemoryStorage;
use crate::core::BackendKind;

use super::active::ActiveBackend;
use super::storage::{DynNetworkedStorage, FailoverStorage};

/// Default MongoDB database name.
pub const DEFAULT_MONGODB_DB_NAME: &str = "movie_db";

/// Configuration inputs for the selection policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    /// Use the relational primary.
    pub use_postgres: bool,
    /// Use the document replica.
    pub use_mongodb: bool,
    /// Relational connection string.
    pub database_url: Option<String>,
    /// Document store connection URI.
    pub mongodb_uri: Option<String>,
    /// Document store database name.
    pub mongodb_db_name: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            use_postgres: false,
            use_mongodb: false,
            database_url: None,
            mongodb_uri: None,
            mongodb_db_name: DEFAULT_MONGODB_DB_NAME.to_string(),
        }
    }
}

impl StorageSettings {
    fn database_url(&self) -> &str {
        self.database_url.as_deref().unwrap_or("")
    }

    fn mongodb_uri(&self) -> &str {
        self.mongodb_uri.as_deref().unwrap_or("")
    }

    /// The relational URL uses a PostgreSQL scheme.
    pub fn postgres_configured(&self) -> bool {
        let url = self.database_url();
        url.starts_with("postgres://") || url.starts_with("postgresql://")
    }

    /// The document URI uses a MongoDB scheme.
    pub fn mongo_configured(&self) -> bool {
        self.mongodb_uri().starts_with("mongodb")
    }

    /// The replica was asked for, explicitly or by providing a URI.
    pub fn wants_mongo(&self) -> bool {
        self.use_mongodb || self.mongo_configured()
    }
}

/// Which storage variant to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageChoice {
    /// In-memory only.
    Memory,
    /// Relational primary only.
    Primary,
    /// Document replica only.
    Replica,
    /// Primary and replica behind the failover coordinator.
    Combined,
}

/// A choice plus the reason a requested backend was skipped, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageDecision {
    /// The variant to construct.
    pub choice: StorageChoice,
    /// Why the configuration was downgraded.
    pub downgrade: Option<String>,
}

impl StorageDecision {
    fn chosen(choice: StorageChoice) -> Self {
        Self {
            choice,
            downgrade: None,
        }
    }

    fn downgraded(choice: StorageChoice, reason: impl Into<String>) -> Self {
        Self {
            choice,
            downgrade: Some(reason.into()),
        }
    }
}

/// Decides which storage variant the settings call for.
///
/// A misconfigured relational URL downgrades a dual configuration to the
/// replica alone, and a single-backend configuration to the replica when one
/// is configured, otherwise to memory.
pub fn choose_storage(settings: &StorageSettings) -> StorageDecision {
    let postgres_ok = settings.postgres_configured();
    let mongo_ok = settings.mongo_configured();

    if settings.use_postgres && settings.wants_mongo() && mongo_ok {
        if !postgres_ok {
            return StorageDecision::downgraded(
                StorageChoice::Replica,
                "DATABASE_URL is not a PostgreSQL connection string, switching to MongoDB storage",
            );
        }
        return StorageDecision::chosen(StorageChoice::Combined);
    }

    if settings.use_postgres {
        let problem = if settings.database_url().is_empty() {
            Some("USE_POSTGRES=true but DATABASE_URL is not set")
        } else if !postgres_ok {
            Some("DATABASE_URL is not a PostgreSQL connection string")
        } else {
            None
        };

        return match problem {
            None => StorageDecision::chosen(StorageChoice::Primary),
            Some(problem) if mongo_ok => StorageDecision::downgraded(
                StorageChoice::Replica,
                format!("{}, switching to MongoDB storage", problem),
            ),
            Some(problem) => StorageDecision::downgraded(
                StorageChoice::Memory,
                format!("{}, falling back to in-memory storage", problem),
            ),
        };
    }

    if settings.wants_mongo() {
        if !mongo_ok {
            return StorageDecision::downgraded(
                StorageChoice::Memory,
                "MONGODB_URI is not a MongoDB connection string, falling back to in-memory storage",
            );
        }
        return StorageDecision::chosen(StorageChoice::Replica);
    }

    StorageDecision::chosen(StorageChoice::Memory)
}

/// The constructed storage variant, as handed to the health monitor.
#[derive(Clone)]
pub enum StorageSelection {
    /// In-memory only.
    Memory(Arc<MemoryStorage>),
    /// Relational primary only.
    Primary(DynNetworkedStorage),
    /// Document replica only.
    Replica(DynNetworkedStorage),
    /// Primary and replica behind the failover coordinator.
    Combined(Arc<FailoverStorage>),
}

impl StorageSelection {
    /// A fresh in-memory selection.
    pub fn memory() -> Self {
        StorageSelection::Memory(Arc::new(MemoryStorage::new()))
    }

    /// The variant to start serving with before any health check.
    pub fn initial_backend(&self) -> ActiveBackend {
        match self {
            StorageSelection::Memory(memory) => ActiveBackend::Memory(Arc::clone(memory)),
            StorageSelection::Primary(backend) | StorageSelection::Replica(backend) => {
                ActiveBackend::Networked(Arc::clone(backend))
            }
            StorageSelection::Combined(failover) => ActiveBackend::Failover(Arc::clone(failover)),
        }
    }

    /// The kind of the selected variant.
    pub fn kind(&self) -> BackendKind {
        match self {
            StorageSelection::Memory(_) => BackendKind::Memory,
            StorageSelection::Primary(_) => BackendKind::Postgres,
            StorageSelection::Replica(_) => BackendKind::MongoDB,
            StorageSelection::Combined(_) => BackendKind::Failover,
        }
    }
}

impl std::fmt::Debug for StorageSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageSelection::Memory(_) => f.write_str("Memory"),
            StorageSelection::Primary(backend) => {
                f.debug_tuple("Primary").field(&backend.backend_name()).finish()
            }
            StorageSelection::Replica(backend) => {
                f.debug_tuple("Replica").field(&backend.backend_name()).finish()
            }
            StorageSelection::Combined(failover) => {
                f.debug_tuple("Combined").field(failover).finish()
            }
        }
    }
}

/// Runs the selection policy and constructs the chosen backends.
///
/// Never fails: a backend whose cargo feature is disabled degrades to
/// memory with an error log, and connection problems are left for the
/// coordinator and health monitor to handle.
pub async fn build_storage(settings: &StorageSettings) -> StorageSelection {
    let decision = choose_storage(settings);
    if let Some(reason) = &decision.downgrade {
        error!(reason = %reason, "Storage configuration downgraded");
    }

    match decision.choice {
        StorageChoice::Memory => {
            info!("Using in-memory storage");
            StorageSelection::memory()
        }
        StorageChoice::Primary => {
            info!("Attempting to connect to PostgreSQL");
            match connect_primary(settings).await {
                Some(primary) => StorageSelection::Primary(primary),
                None => StorageSelection::memory(),
            }
        }
        StorageChoice::Replica => {
            info!("Attempting to connect to MongoDB");
            match connect_replica(settings) {
                Some(replica) => StorageSelection::Replica(replica),
                None => StorageSelection::memory(),
            }
        }
        StorageChoice::Combined => {
            info!("Attempting to connect to PostgreSQL (primary) and MongoDB (replica)");
            match (connect_primary(settings).await, connect_replica(settings)) {
                (Some(primary), Some(replica)) => {
                    StorageSelection::Combined(Arc::new(FailoverStorage::new(primary, replica)))
                }
                (Some(primary), None) => StorageSelection::Primary(primary),
                (None, Some(replica)) => StorageSelection::Replica(replica),
                (None, None) => StorageSelection::memory(),
            }
        }
    }
}

#[cfg(feature = "postgres")]
async fn connect_primary(settings: &StorageSettings) -> Option<DynNetworkedStorage> {
    use crate::backends::postgres::PostgresBackend;

    let backend = PostgresBackend::connect(settings.database_url()).await;
    Some(Arc::new(backend))
}

#[cfg(not(feature = "postgres"))]
async fn connect_primary(_settings: &StorageSettings) -> Option<DynNetworkedStorage> {
    error!("PostgreSQL requested but the `postgres` feature is not enabled");
    None
}

#[cfg(feature = "mongodb")]
fn connect_replica(settings: &StorageSettings) -> Option<DynNetworkedStorage> {
    use crate::backends::mongodb::{MongoBackend, MongoConfig};

    let config =
        MongoConfig::new(settings.mongodb_uri()).with_database(settings.mongodb_db_name.clone());
    Some(Arc::new(MongoBackend::new(config)))
}

#[cfg(not(feature = "mongodb"))]
fn connect_replica(_settings: &StorageSettings) -> Option<DynNetworkedStorage> {
    error!("MongoDB requested but the `mongodb` feature is not enabled");
    None
}
