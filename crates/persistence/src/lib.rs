//! Marquee Persistence Layer
//!
//! Storage for the movie catalog: a relational primary, a document replica
//! and an in-memory store composed behind one [`MovieStorage`](core::MovieStorage)
//! trait, with availability tracking, startup health checks and automatic
//! failover.
//!
//! # Backend Features
//!
//! ```toml
//! [dependencies]
//! marquee-persistence = { version = "0.1", features = ["postgres", "mongodb"] }
//! ```
//!
//! - `postgres` (default) - PostgreSQL primary via tokio-postgres and deadpool
//! - `mongodb` (default) - MongoDB replica
//!
//! # Architecture
//!
//! - [`types`] - the catalog record, inputs, pagination and validation
//! - [`error`] - error types for all operations
//! - [`core`] - storage traits
//! - [`backends`] - memory, PostgreSQL and MongoDB implementations
//! - [`composite`] - failover coordinator, selection policy and health monitor
//!
//! # Quick Start
//!
//! ```
//! use marquee_persistence::composite::{ActiveStorage, StorageSettings, build_storage};
//! use marquee_persistence::core::MovieStorage;
//! use marquee_persistence::types::{PageRequest, validate_new_movie};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let selection = build_storage(&StorageSettings::default()).await;
//! let storage = ActiveStorage::new(selection.initial_backend());
//!
//! let input = validate_new_movie(&json!({
//!     "title": "Inception",
//!     "type": "Movie",
//!     "director": "Nolan",
//!     "year": 2010,
//!     "duration": 148
//! }))
//! .unwrap();
//!
//! let movie = storage.create(input).await.unwrap();
//! assert_eq!(movie.id, 1);
//! assert_eq!(storage.list(PageRequest::default()).await.unwrap().total, 1);
//! # }
//! ```

#![warn(missing_docs)]

pub mod backends;
pub mod composite;
pub mod core;
pub mod error;
pub mod types;

pub use composite::{ActiveStorage, FailoverStorage, HealthMonitor};
pub use core::{BackendKind, MovieStorage, NetworkedStorage, StorageStatus};
pub use error::{BackendError, StorageError, StorageResult, ValidationError};
pub use types::{Movie, MoviePage, MovieType, MovieUpdate, NewMovie, PageRequest};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
