//! Test infrastructure for the failover layer.
//!
//! [`MockBackend`] is an in-process [`NetworkedStorage`] whose operations and
//! probes can be made to fail on demand.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use marquee_persistence::backends::memory::MemoryStorage;
use marquee_persistence::core::{BackendKind, MovieStorage, NetworkedStorage};
use marquee_persistence::error::{BackendError, StorageError, StorageResult};
use marquee_persistence::types::{Movie, MoviePage, MovieUpdate, NewMovie, PageRequest};

pub use fixtures::*;

/// Probe failure count meaning "never recover".
pub const ALWAYS: u32 = u32::MAX;

/// A networked backend backed by memory, with switchable failures.
pub struct MockBackend {
    name: &'static str,
    kind: BackendKind,
    store: MemoryStorage,
    failing: AtomicBool,
    probe_failures: AtomicU32,
    probe_calls: AtomicU32,
    op_calls: AtomicU32,
}

impl MockBackend {
    fn new(name: &'static str, kind: BackendKind) -> Arc<Self> {
        Arc::new(Self {
            name,
            kind,
            store: MemoryStorage::new(),
            failing: AtomicBool::new(false),
            probe_failures: AtomicU32::new(0),
            probe_calls: AtomicU32::new(0),
            op_calls: AtomicU32::new(0),
        })
    }

    /// A healthy stand-in for the relational primary.
    pub fn primary() -> Arc<Self> {
        Self::new("mock-postgres", BackendKind::Postgres)
    }

    /// A healthy stand-in for the document replica.
    pub fn replica() -> Arc<Self> {
        Self::new("mock-mongodb", BackendKind::MongoDB)
    }

    /// Makes every storage operation (not probes) fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Makes the next `count` probes fail. [`ALWAYS`] never recovers.
    pub fn fail_probes(&self, count: u32) {
        self.probe_failures.store(count, Ordering::SeqCst);
    }

    /// Fails both operations and probes.
    pub fn go_down(&self) {
        self.set_failing(true);
        self.fail_probes(ALWAYS);
    }

    /// Number of probes received.
    pub fn probe_calls(&self) -> u32 {
        self.probe_calls.load(Ordering::SeqCst)
    }

    /// Number of storage operations received, failed ones included.
    pub fn op_calls(&self) -> u32 {
        self.op_calls.load(Ordering::SeqCst)
    }

    /// The records this backend holds.
    pub fn store(&self) -> &MemoryStorage {
        &self.store
    }

    fn check(&self) -> StorageResult<()> {
        self.op_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Backend(BackendError::Unavailable {
                backend_name: self.name.to_string(),
                message: "mock backend is down".to_string(),
            }));
        }
        Ok(())
    }
}

#[async_trait]
impl MovieStorage for MockBackend {
    fn backend_name(&self) -> &'static str {
        self.name
    }

    fn backend_kind(&self) -> BackendKind {
        self.kind
    }

    async fn create(&self, input: NewMovie) -> StorageResult<Movie> {
        self.check()?;
        self.store.create(input).await
    }

    async fn list(&self, page: PageRequest) -> StorageResult<MoviePage> {
        self.check()?;
        self.store.list(page).await
    }

    async fn get(&self, id: i64) -> StorageResult<Option<Movie>> {
        self.check()?;
        self.store.get(id).await
    }

    async fn update(&self, id: i64, update: MovieUpdate) -> StorageResult<Option<Movie>> {
        self.check()?;
        self.store.update(id, update).await
    }

    async fn delete(&self, id: i64) -> StorageResult<bool> {
        self.check()?;
        self.store.delete(id).await
    }
}

#[async_trait]
impl NetworkedStorage for MockBackend {
    async fn verify_connection(&self) -> StorageResult<()> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.probe_failures.load(Ordering::SeqCst);
        if remaining == 0 {
            return Ok(());
        }
        if remaining != ALWAYS {
            self.probe_failures.store(remaining - 1, Ordering::SeqCst);
        }
        Err(StorageError::Backend(BackendError::ConnectionFailed {
            backend_name: self.name.to_string(),
            message: "connection refused".to_string(),
        }))
    }

    async fn upsert(&self, movie: &Movie) -> StorageResult<()> {
        self.check()?;
        self.store.insert(movie.clone());
        Ok(())
    }
}
