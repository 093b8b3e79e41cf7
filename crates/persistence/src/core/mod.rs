//! Core storage traits and abstractions.
//!
//! - [`MovieStorage`] - CRUD over catalog records, implemented by every variant
//! - [`NetworkedStorage`] - probe and mirror operations of the networked adapters
//! - [`BackendKind`] - backend identification
//!
//! ```text
//! MovieStorage
//!     ├── MemoryStorage
//!     ├── FailoverStorage
//!     ├── ActiveStorage
//!     └── NetworkedStorage
//!             ├── PostgresBackend
//!             └── MongoBackend
//! ```

pub mod backend;
pub mod storage;

pub use backend::BackendKind;
pub use storage::{MovieStorage, NetworkedStorage, StorageStatus};
