//! Failover storage.
//!
//! This module composes the primary and replica stores into a single
//! [`MovieStorage`](crate::core::MovieStorage) and keeps it healthy.
//!
//! - [`FailoverStorage`] - ordered fallback chain primary → replica → memory
//!   with availability flags and best-effort mirroring
//! - [`ActiveStorage`] - the atomically swappable handle served to requests
//! - [`choose_storage`] / [`build_storage`] - startup selection policy
//! - [`HealthMonitor`] - probes backends and reconfigures the active storage
//!
//! # Tiers
//!
//! ```text
//!            ┌──────────────┐
//! request ──▶│ActiveStorage │── swap ◀── HealthMonitor
//!            └──────┬───────┘
//!                   ▼
//!          ┌─────────────────┐
//!          │ FailoverStorage │
//!          └─┬──────┬──────┬─┘
//!            ▼      ▼      ▼
//!        primary replica memory
//! ```

pub mod active;
pub mod config;
pub mod health;
pub mod selection;
pub mod storage;

pub use active::{ActiveBackend, ActiveStorage};
pub use config::HealthConfig;
pub use health::{HealthMonitor, HealthOutcome, probe_with_retry};
pub use selection::{
    DEFAULT_MONGODB_DB_NAME, StorageChoice, StorageDecision, StorageSelection, StorageSettings,
    build_storage, choose_storage,
};
pub use storage::{DynNetworkedStorage, FailoverStorage};
