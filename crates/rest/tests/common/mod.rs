//! Shared infrastructure for API tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use marquee_persistence::core::{BackendKind, MovieStorage, NetworkedStorage};
use marquee_persistence::error::{BackendError, StorageError, StorageResult};
use marquee_persistence::types::{Movie, MoviePage, MovieUpdate, NewMovie, PageRequest};
use marquee_rest::{ServerConfig, create_app_with_config};
use serde_json::{Value, json};

/// Creates a test server over `storage` with test configuration.
pub fn test_server<S>(storage: S) -> TestServer
where
    S: MovieStorage + Send + Sync + 'static,
{
    let app: Router = create_app_with_config(storage, ServerConfig::for_testing());
    TestServer::new(app).expect("Failed to create test server")
}

/// A valid create body for a feature film.
pub fn inception() -> Value {
    json!({
        "title": "Inception",
        "type": "Movie",
        "director": "Christopher Nolan",
        "budget": 16000000,
        "location": "Los Angeles",
        "duration": 148,
        "year": 2010,
        "additionalDetails": "Dream heist"
    })
}

/// A valid create body for a TV show.
pub fn show(title: &str, year: i32) -> Value {
    json!({
        "title": title,
        "type": "TV Show",
        "director": "Various",
        "year": year
    })
}

/// How a [`FailingStorage`] fails.
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    /// The backend cannot be reached.
    Unavailable,
    /// Queries fail for other reasons.
    Query,
}

/// A backend whose every operation fails.
pub struct FailingStorage {
    failure: Failure,
}

impl FailingStorage {
    /// A backend that reports itself unreachable.
    pub fn unavailable() -> Self {
        Self {
            failure: Failure::Unavailable,
        }
    }

    /// A backend whose queries break.
    pub fn broken() -> Self {
        Self {
            failure: Failure::Query,
        }
    }

    fn fail<T>(&self) -> StorageResult<T> {
        let err = match self.failure {
            Failure::Unavailable => BackendError::Unavailable {
                backend_name: "postgres".to_string(),
                message: "PostgreSQL database is not connected".to_string(),
            },
            Failure::Query => BackendError::QueryError {
                message: "relation \"movies\" does not exist".to_string(),
            },
        };
        Err(StorageError::Backend(err))
    }
}

#[async_trait]
impl MovieStorage for FailingStorage {
    fn backend_name(&self) -> &'static str {
        "failing"
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::Postgres
    }

    async fn create(&self, _input: NewMovie) -> StorageResult<Movie> {
        self.fail()
    }

    async fn list(&self, _page: PageRequest) -> StorageResult<MoviePage> {
        self.fail()
    }

    async fn get(&self, _id: i64) -> StorageResult<Option<Movie>> {
        self.fail()
    }

    async fn update(&self, _id: i64, _update: MovieUpdate) -> StorageResult<Option<Movie>> {
        self.fail()
    }

    async fn delete(&self, _id: i64) -> StorageResult<bool> {
        self.fail()
    }
}

#[async_trait]
impl NetworkedStorage for FailingStorage {
    async fn verify_connection(&self) -> StorageResult<()> {
        self.fail()
    }

    async fn upsert(&self, _movie: &Movie) -> StorageResult<()> {
        self.fail()
    }
}
