//! In-process, non-persistent record store.
//!
//! The terminal fallback tier. It never fails: every operation returns `Ok`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::core::{BackendKind, MovieStorage};
use crate::error::StorageResult;
use crate::types::{Movie, MoviePage, MovieUpdate, NewMovie, PageRequest};

#[derive(Debug)]
struct Inner {
    movies: HashMap<i64, Movie>,
    next_id: i64,
}

/// A keyed in-memory store with sequential ids starting at 1.
#[derive(Debug)]
pub struct MemoryStorage {
    inner: Mutex<Inner>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                movies: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.inner.lock().movies.len()
    }

    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stores `movie` under its own id, replacing any existing record.
    ///
    /// Used to seed a store with records minted elsewhere. The id sequence
    /// is bumped past `movie.id`.
    pub fn insert(&self, movie: Movie) {
        let mut inner = self.inner.lock();
        inner.next_id = inner.next_id.max(movie.id + 1);
        inner.movies.insert(movie.id, movie);
    }
}

#[async_trait]
impl MovieStorage for MemoryStorage {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn create(&self, input: NewMovie) -> StorageResult<Movie> {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;

        let movie = Movie::from_new(id, input, Utc::now());
        inner.movies.insert(id, movie.clone());
        Ok(movie)
    }

    async fn list(&self, page: PageRequest) -> StorageResult<MoviePage> {
        let inner = self.inner.lock();
        let mut all: Vec<&Movie> = inner.movies.values().collect();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let data = all
            .into_iter()
            .skip(offset)
            .take(page.limit as usize)
            .cloned()
            .collect();

        Ok(MoviePage::new(data, inner.movies.len() as u64))
    }

    async fn get(&self, id: i64) -> StorageResult<Option<Movie>> {
        Ok(self.inner.lock().movies.get(&id).cloned())
    }

    async fn update(&self, id: i64, update: MovieUpdate) -> StorageResult<Option<Movie>> {
        let mut inner = self.inner.lock();
        let Some(movie) = inner.movies.get_mut(&id) else {
            return Ok(None);
        };
        movie.apply(&update, Utc::now());
        Ok(Some(movie.clone()))
    }

    async fn delete(&self, id: i64) -> StorageResult<bool> {
        Ok(self.inner.lock().movies.remove(&id).is_some())
    }
}
