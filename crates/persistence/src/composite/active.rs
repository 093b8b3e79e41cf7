//! The swappable handle the HTTP layer holds.
//!
//! The health monitor may replace the active storage at runtime (for
//! example with the bare replica when the primary is down at startup).
//! [`ActiveStorage`] keeps the current variant in an [`ArcSwap`] cell: each
//! call loads the current variant once and keeps it alive until the call
//! finishes, so a swap never disturbs in-flight requests.

use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use tracing::info;

use crate::backends::memory::MemoryStorage;
use crate::core::{BackendKind, MovieStorage, StorageStatus};
use crate::error::StorageResult;
use crate::types::{Movie, MoviePage, MovieUpdate, NewMovie, PageRequest};

use super::storage::{DynNetworkedStorage, FailoverStorage};

/// One of the storage variants that can serve requests.
#[derive(Clone)]
pub enum ActiveBackend {
    /// In-memory store.
    Memory(Arc<MemoryStorage>),
    /// A single networked adapter used directly.
    Networked(DynNetworkedStorage),
    /// Primary and replica behind the failover coordinator.
    Failover(Arc<FailoverStorage>),
}

impl ActiveBackend {
    /// The variant as a storage trait object.
    pub fn storage(&self) -> &dyn MovieStorage {
        match self {
            ActiveBackend::Memory(memory) => memory.as_ref(),
            ActiveBackend::Networked(networked) => networked.as_ref(),
            ActiveBackend::Failover(failover) => failover.as_ref(),
        }
    }

    /// The kind of the wrapped backend.
    pub fn kind(&self) -> BackendKind {
        self.storage().backend_kind()
    }
}

impl std::fmt::Debug for ActiveBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ActiveBackend")
            .field(&self.storage().backend_name())
            .finish()
    }
}

/// A cloneable, atomically swappable [`MovieStorage`].
#[derive(Clone)]
pub struct ActiveStorage {
    cell: Arc<ArcSwap<ActiveBackend>>,
}

impl std::fmt::Debug for ActiveStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveStorage")
            .field("current", &self.cell.load().storage().backend_name())
            .finish()
    }
}

impl ActiveStorage {
    /// Creates a handle serving `backend`.
    pub fn new(backend: ActiveBackend) -> Self {
        Self {
            cell: Arc::new(ArcSwap::from_pointee(backend)),
        }
    }

    /// A handle serving a fresh in-memory store.
    pub fn memory() -> Self {
        Self::new(ActiveBackend::Memory(Arc::new(MemoryStorage::new())))
    }

    /// The variant currently serving requests.
    pub fn current(&self) -> Arc<ActiveBackend> {
        self.cell.load_full()
    }

    /// Replaces the active variant, returning the previous one.
    pub fn replace(&self, backend: ActiveBackend) -> Arc<ActiveBackend> {
        let previous = self.cell.swap(Arc::new(backend));
        info!(
            from = previous.storage().backend_name(),
            to = self.cell.load().storage().backend_name(),
            "Active storage replaced"
        );
        previous
    }
}

#[async_trait]
impl MovieStorage for ActiveStorage {
    fn backend_name(&self) -> &'static str {
        self.cell.load().storage().backend_name()
    }

    fn backend_kind(&self) -> BackendKind {
        self.cell.load().kind()
    }

    async fn create(&self, input: NewMovie) -> StorageResult<Movie> {
        let current = self.current();
        current.storage().create(input).await
    }

    async fn list(&self, page: PageRequest) -> StorageResult<MoviePage> {
        let current = self.current();
        current.storage().list(page).await
    }

    async fn get(&self, id: i64) -> StorageResult<Option<Movie>> {
        let current = self.current();
        current.storage().get(id).await
    }

    async fn update(&self, id: i64, update: MovieUpdate) -> StorageResult<Option<Movie>> {
        let current = self.current();
        current.storage().update(id, update).await
    }

    async fn delete(&self, id: i64) -> StorageResult<bool> {
        let current = self.current();
        current.storage().delete(id).await
    }

    fn status(&self) -> StorageStatus {
        self.cell.load().storage().status()
    }
}
