//! Failover coordinator over a primary and a replica store.
//!
//! Every operation walks the tiers in order: primary, replica, then a
//! lazily created in-memory store. A tier is skipped while its availability
//! flag is down; an error flips the flag down and moves on, a success
//! flips it back up. The in-memory tier never fails, so coordinator
//! operations always succeed.
//!
//! Successful primary writes are mirrored into the replica. Mirror failures
//! only mark the replica unavailable and are never reported to the caller.
//!
//! "Not found" handling differs per operation:
//!
//! | Operation | Primary absent | Replica absent |
//! |-----------|----------------|----------------|
//! | `get`     | try replica    | final answer   |
//! | `update`  | try replica    | try memory     |
//! | `delete`  | replica is always asked too; memory only if neither deleted | |
//! | `list`    | final answer   | final answer   |

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::backends::memory::MemoryStorage;
use crate::core::{BackendKind, MovieStorage, NetworkedStorage, StorageStatus};
use crate::error::{StorageError, StorageResult};
use crate::types::{Movie, MoviePage, MovieUpdate, NewMovie, PageRequest};

/// Type alias for a shared networked backend.
pub type DynNetworkedStorage = Arc<dyn NetworkedStorage + Send + Sync>;

/// Composes a primary and a replica behind [`MovieStorage`].
///
/// Both availability flags start out `true`. They are hints updated by
/// every call and by the health monitor; concurrent calls may race on
/// them, which costs at most one extra failed attempt.
pub struct FailoverStorage {
    primary: DynNetworkedStorage,
    replica: DynNetworkedStorage,
    primary_available: AtomicBool,
    replica_available: AtomicBool,
    fallback: OnceLock<MemoryStorage>,
}

impl std::fmt::Debug for FailoverStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailoverStorage")
            .field("primary", &self.primary.backend_name())
            .field("replica", &self.replica.backend_name())
            .field("primary_available", &self.primary_available())
            .field("replica_available", &self.replica_available())
            .field("fallback_active", &self.fallback.get().is_some())
            .finish()
    }
}

impl FailoverStorage {
    /// Creates a coordinator. Both backends are assumed available.
    pub fn new(primary: DynNetworkedStorage, replica: DynNetworkedStorage) -> Self {
        Self {
            primary,
            replica,
            primary_available: AtomicBool::new(true),
            replica_available: AtomicBool::new(true),
            fallback: OnceLock::new(),
        }
    }

    /// The primary backend.
    pub fn primary(&self) -> &DynNetworkedStorage {
        &self.primary
    }

    /// The replica backend.
    pub fn replica(&self) -> &DynNetworkedStorage {
        &self.replica
    }

    /// Whether the primary is currently believed reachable.
    pub fn primary_available(&self) -> bool {
        self.primary_available.load(Ordering::Relaxed)
    }

    /// Whether the replica is currently believed reachable.
    pub fn replica_available(&self) -> bool {
        self.replica_available.load(Ordering::Relaxed)
    }

    /// Sets the primary availability flag.
    pub fn set_primary_available(&self, available: bool) {
        self.primary_available.store(available, Ordering::Relaxed);
    }

    /// Sets the replica availability flag.
    pub fn set_replica_available(&self, available: bool) {
        self.replica_available.store(available, Ordering::Relaxed);
    }

    /// The in-memory fallback, created on first use.
    pub fn fallback(&self) -> &MemoryStorage {
        self.fallback.get_or_init(|| {
            warn!("Creating in-memory fallback store");
            MemoryStorage::new()
        })
    }

    /// Returns true once the in-memory fallback has been used.
    pub fn fallback_in_use(&self) -> bool {
        self.fallback.get().is_some()
    }

    fn primary_failed(&self, operation: &'static str, error: &StorageError) {
        self.set_primary_available(false);
        warn!(
            backend = self.primary.backend_name(),
            operation,
            error = %error,
            "Primary operation failed"
        );
    }

    fn replica_failed(&self, operation: &'static str, error: &StorageError) {
        self.set_replica_available(false);
        warn!(
            backend = self.replica.backend_name(),
            operation,
            error = %error,
            "Replica operation failed"
        );
    }

    /// Copies a primary write into the replica. Never fails.
    async fn mirror(&self, movie: &Movie) {
        if !self.replica_available() {
            return;
        }
        match self.replica.upsert(movie).await {
            Ok(()) => {
                self.set_replica_available(true);
                debug!(id = movie.id, "Mirrored movie to replica");
            }
            Err(e) => {
                self.set_replica_available(false);
                warn!(id = movie.id, error = %e, "Replica synchronization failed");
            }
        }
    }
}

#[async_trait]
impl MovieStorage for FailoverStorage {
    fn backend_name(&self) -> &'static str {
        "failover"
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::Failover
    }

    #[instrument(skip(self, input))]
    async fn create(&self, input: NewMovie) -> StorageResult<Movie> {
        if self.primary_available() {
            match self.primary.create(input.clone()).await {
                Ok(movie) => {
                    self.set_primary_available(true);
                    self.mirror(&movie).await;
                    return Ok(movie);
                }
                Err(e) => self.primary_failed("create", &e),
            }
        }

        if self.replica_available() {
            match self.replica.create(input.clone()).await {
                Ok(movie) => {
                    self.set_replica_available(true);
                    return Ok(movie);
                }
                Err(e) => self.replica_failed("create", &e),
            }
        }

        self.fallback().create(input).await
    }

    #[instrument(skip(self))]
    async fn list(&self, page: PageRequest) -> StorageResult<MoviePage> {
        if self.primary_available() {
            match self.primary.list(page).await {
                Ok(result) => {
                    self.set_primary_available(true);
                    return Ok(result);
                }
                Err(e) => self.primary_failed("list", &e),
            }
        }

        if self.replica_available() {
            match self.replica.list(page).await {
                Ok(result) => {
                    self.set_replica_available(true);
                    return Ok(result);
                }
                Err(e) => self.replica_failed("list", &e),
            }
        }

        self.fallback().list(page).await
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i64) -> StorageResult<Option<Movie>> {
        if self.primary_available() {
            match self.primary.get(id).await {
                Ok(found) => {
                    self.set_primary_available(true);
                    if found.is_some() {
                        return Ok(found);
                    }
                }
                Err(e) => self.primary_failed("get", &e),
            }
        }

        if self.replica_available() {
            match self.replica.get(id).await {
                Ok(found) => {
                    self.set_replica_available(true);
                    return Ok(found);
                }
                Err(e) => self.replica_failed("get", &e),
            }
        }

        self.fallback().get(id).await
    }

    #[instrument(skip(self, update))]
    async fn update(&self, id: i64, update: MovieUpdate) -> StorageResult<Option<Movie>> {
        if self.primary_available() {
            match self.primary.update(id, update.clone()).await {
                Ok(updated) => {
                    self.set_primary_available(true);
                    if let Some(movie) = updated {
                        self.mirror(&movie).await;
                        return Ok(Some(movie));
                    }
                }
                Err(e) => self.primary_failed("update", &e),
            }
        }

        if self.replica_available() {
            match self.replica.update(id, update.clone()).await {
                Ok(updated) => {
                    self.set_replica_available(true);
                    if updated.is_some() {
                        return Ok(updated);
                    }
                }
                Err(e) => self.replica_failed("update", &e),
            }
        }

        self.fallback().update(id, update).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> StorageResult<bool> {
        let mut primary_deleted = false;
        if self.primary_available() {
            match self.primary.delete(id).await {
                Ok(deleted) => {
                    self.set_primary_available(true);
                    primary_deleted = deleted;
                }
                Err(e) => self.primary_failed("delete", &e),
            }
        }

        let mut replica_deleted = false;
        if self.replica_available() {
            match self.replica.delete(id).await {
                Ok(deleted) => {
                    self.set_replica_available(true);
                    replica_deleted = deleted;
                }
                Err(e) => self.replica_failed("delete", &e),
            }
        }

        if primary_deleted || replica_deleted {
            return Ok(true);
        }
        self.fallback().delete(id).await
    }

    fn status(&self) -> StorageStatus {
        StorageStatus {
            backend: self.backend_name(),
            primary_available: Some(self.primary_available()),
            replica_available: Some(self.replica_available()),
        }
    }
}
