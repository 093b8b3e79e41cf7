//! Core movie storage traits.
//!
//! [`MovieStorage`] is the capability set every storage variant implements:
//! the in-memory store, the two networked adapters, the failover coordinator
//! and the swappable [`ActiveStorage`](crate::composite::ActiveStorage) cell.
//! [`NetworkedStorage`] adds the probe and mirror operations only the
//! networked adapters provide.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::StorageResult;
use crate::types::{Movie, MoviePage, MovieUpdate, NewMovie, PageRequest};

use super::BackendKind;

/// Core storage trait for catalog records.
///
/// "Not found" is never an error: reads return `None` and deletes return
/// `false`. Errors mean the backend could not answer.
///
/// # Example
///
/// ```
/// use marquee_persistence::backends::memory::MemoryStorage;
/// use marquee_persistence::core::MovieStorage;
/// use marquee_persistence::types::{validate_new_movie, PageRequest};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let storage = MemoryStorage::new();
/// let input = validate_new_movie(&json!({
///     "title": "Show", "type": "TV Show", "director": "X", "year": 2020
/// })).unwrap();
///
/// let created = storage.create(input).await.unwrap();
/// assert_eq!(created.id, 1);
/// assert!(storage.get(1).await.unwrap().is_some());
/// assert_eq!(storage.list(PageRequest::new(1, 20)).await.unwrap().total, 1);
/// assert!(storage.delete(1).await.unwrap());
/// assert!(!storage.delete(1).await.unwrap());
/// # }
/// ```
#[async_trait]
pub trait MovieStorage: Send + Sync {
    /// Returns a human-readable name for this storage backend.
    fn backend_name(&self) -> &'static str;

    /// Returns the kind of backend.
    fn backend_kind(&self) -> BackendKind;

    /// Creates a record, assigning its id and both timestamps.
    async fn create(&self, input: NewMovie) -> StorageResult<Movie>;

    /// Lists one page of records, newest first, with the total record count.
    async fn list(&self, page: PageRequest) -> StorageResult<MoviePage>;

    /// Reads a record by id.
    async fn get(&self, id: i64) -> StorageResult<Option<Movie>>;

    /// Applies a partial update and refreshes `updated_at`.
    ///
    /// Returns `None` if no record has this id.
    async fn update(&self, id: i64, update: MovieUpdate) -> StorageResult<Option<Movie>>;

    /// Deletes a record. Returns true iff a record was removed.
    async fn delete(&self, id: i64) -> StorageResult<bool>;

    /// A snapshot of which backend is serving requests.
    fn status(&self) -> StorageStatus {
        StorageStatus::single(self.backend_name())
    }
}

/// Extra capabilities of the two networked adapters.
#[async_trait]
pub trait NetworkedStorage: MovieStorage {
    /// Probes the backend. Succeeds iff the backend answered.
    async fn verify_connection(&self) -> StorageResult<()>;

    /// Idempotently writes `movie` under its existing id.
    ///
    /// Used to mirror records created elsewhere; the backend's own id
    /// sequence is advanced so that it never hands out `movie.id` again.
    async fn upsert(&self, movie: &Movie) -> StorageResult<()>;
}

/// Which backend is serving requests, and the coordinator's availability hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStatus {
    /// Name of the active backend.
    pub backend: &'static str,
    /// Primary availability flag. Only reported by the coordinator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_available: Option<bool>,
    /// Replica availability flag. Only reported by the coordinator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replica_available: Option<bool>,
}

impl StorageStatus {
    /// Status of a single backend without availability flags.
    pub fn single(backend: &'static str) -> Self {
        Self {
            backend,
            primary_available: None,
            replica_available: None,
        }
    }
}
