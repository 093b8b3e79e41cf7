//! MongoDB replica store.
//!
//! The document replica mints its own ids from a counter document
//! (`counters` collection, `_id: "movies"`, integer field `seq`) and accepts
//! mirrored records through [`NetworkedStorage::upsert`], which bumps the
//! counter to at least the mirrored id.
//!
//! Lookups match ids stored either as numbers or as strings, and every
//! document read is normalized so `id` is an integer.
//!
//! [`NetworkedStorage::upsert`]: crate::core::NetworkedStorage::upsert
//!
//! # Example
//!
//! ```no_run
//! use marquee_persistence::backends::mongodb::{MongoBackend, MongoConfig};
//! use marquee_persistence::core::{MovieStorage, NetworkedStorage};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = MongoBackend::new(MongoConfig::new("mongodb://localhost:27017"));
//! backend.verify_connection().await?;
//! let movie = backend.get(7).await?;
//! # Ok(())
//! # }
//! ```

mod backend;
pub mod document;
mod storage;

pub use backend::{
    COUNTERS_COLLECTION, MOVIES_COLLECTION, MOVIES_COUNTER_ID, MongoBackend, MongoConfig,
    is_mongo_uri,
};
