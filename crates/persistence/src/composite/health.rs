//! Startup health checks and failover decisions.
//!
//! The monitor probes the selected backends with bounded retries and then
//! adjusts the coordinator's availability flags or replaces the active
//! storage outright:
//!
//! | Primary | Replica | Action |
//! |---------|---------|--------|
//! | up      | up      | keep the coordinator, both flags up |
//! | down    | up      | serve from the bare replica for the rest of the process |
//! | up      | down    | replica flag down, check again later |
//! | down    | down    | both flags down, check again later |
//!
//! A single-backend configuration whose probe fails is replaced by an
//! in-memory store and never re-checked.
//!
//! # Example
//!
//! ```no_run
//! use marquee_persistence::composite::{
//!     ActiveStorage, HealthConfig, HealthMonitor, StorageSettings, build_storage,
//! };
//!
//! # async fn example() {
//! let selection = build_storage(&StorageSettings::default()).await;
//! let active = ActiveStorage::new(selection.initial_backend());
//!
//! // Runs in the background; `active` is updated in place.
//! HealthMonitor::new(HealthConfig::default(), selection, active.clone()).spawn();
//! # }
//! ```

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::backends::memory::MemoryStorage;
use crate::core::NetworkedStorage;
use crate::error::StorageError;

use super::active::{ActiveBackend, ActiveStorage};
use super::config::HealthConfig;
use super::selection::StorageSelection;
use super::storage::FailoverStorage;

/// Result of one health check pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthOutcome {
    /// Primary and replica both answered.
    BothAvailable,
    /// Only the replica answered; it now serves requests directly.
    ReplicaOnly,
    /// Only the primary answered; the replica is re-checked later.
    PrimaryOnly,
    /// Neither answered; both are re-checked later.
    NoneAvailable,
    /// The single configured backend answered.
    SingleBackendHealthy,
    /// The single configured backend did not answer; memory serves requests.
    DegradedToMemory,
    /// Memory was selected; nothing to check.
    MemoryOnly,
}

impl HealthOutcome {
    /// Returns true if the monitor should check again after the re-check interval.
    pub fn needs_recheck(&self) -> bool {
        matches!(self, HealthOutcome::PrimaryOnly | HealthOutcome::NoneAvailable)
    }
}

/// Probes `backend` up to `config.attempts` times.
///
/// Returns the attempt number that succeeded, or the last error.
pub async fn probe_with_retry(
    backend: &dyn NetworkedStorage,
    config: &HealthConfig,
) -> Result<u32, StorageError> {
    let attempts = config.attempts.max(1);
    let mut attempt = 1;
    loop {
        match backend.verify_connection().await {
            Ok(()) => return Ok(attempt),
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                debug!(
                    backend = backend.backend_name(),
                    attempt,
                    error = %e,
                    "Health probe failed, retrying"
                );
                attempt += 1;
                tokio::time::sleep(config.retry_delay).await;
            }
        }
    }
}

/// Verifies the selected storage and reconfigures it on failure.
pub struct HealthMonitor {
    config: HealthConfig,
    selection: StorageSelection,
    active: ActiveStorage,
}

impl HealthMonitor {
    /// Creates a monitor for `selection`, reconfiguring `active`.
    pub fn new(config: HealthConfig, selection: StorageSelection, active: ActiveStorage) -> Self {
        Self {
            config,
            selection,
            active,
        }
    }

    /// Runs checks until no re-check is needed and returns the final outcome.
    ///
    /// For a coordinator stuck in `PrimaryOnly` or `NoneAvailable` this
    /// keeps running for the life of the process.
    pub async fn run(self) -> HealthOutcome {
        loop {
            let outcome = self.check_once().await;
            if !outcome.needs_recheck() {
                return outcome;
            }
            debug!(
                interval = %humantime::format_duration(self.config.recheck_interval),
                "Re-checking storage later"
            );
            tokio::time::sleep(self.config.recheck_interval).await;
        }
    }

    /// Runs [`HealthMonitor::run`] on a background task.
    pub fn spawn(self) -> JoinHandle<HealthOutcome> {
        tokio::spawn(self.run())
    }

    /// Performs a single check pass.
    pub async fn check_once(&self) -> HealthOutcome {
        match &self.selection {
            StorageSelection::Memory(_) => {
                info!("Using in-memory storage");
                HealthOutcome::MemoryOnly
            }
            StorageSelection::Primary(backend) | StorageSelection::Replica(backend) => {
                self.check_single(backend.as_ref()).await
            }
            StorageSelection::Combined(failover) => self.check_combined(failover).await,
        }
    }

    async fn check_single(&self, backend: &dyn NetworkedStorage) -> HealthOutcome {
        match probe_with_retry(backend, &self.config).await {
            Ok(attempt) => {
                info!(backend = backend.backend_name(), attempt, "Storage backend healthy");
                HealthOutcome::SingleBackendHealthy
            }
            Err(e) => {
                error!(
                    backend = backend.backend_name(),
                    error = %e,
                    "Storage backend unreachable, using in-memory storage"
                );
                self.active
                    .replace(ActiveBackend::Memory(Arc::new(MemoryStorage::new())));
                HealthOutcome::DegradedToMemory
            }
        }
    }

    async fn check_combined(&self, failover: &Arc<FailoverStorage>) -> HealthOutcome {
        let (primary, replica) = tokio::join!(
            probe_with_retry(failover.primary().as_ref(), &self.config),
            probe_with_retry(failover.replica().as_ref(), &self.config),
        );

        failover.set_primary_available(primary.is_ok());
        failover.set_replica_available(replica.is_ok());

        if let Err(e) = &primary {
            error!(backend = failover.primary().backend_name(), error = %e, "Primary health check failed");
        }
        if let Err(e) = &replica {
            error!(backend = failover.replica().backend_name(), error = %e, "Replica health check failed");
        }

        match (primary.is_ok(), replica.is_ok()) {
            (true, true) => {
                info!("Running PostgreSQL primary with MongoDB replica");
                HealthOutcome::BothAvailable
            }
            (false, true) => {
                warn!("Primary unavailable, running with the replica only");
                self.active
                    .replace(ActiveBackend::Networked(Arc::clone(failover.replica())));
                HealthOutcome::ReplicaOnly
            }
            (true, false) => {
                warn!("Replica unavailable, running with the primary only");
                HealthOutcome::PrimaryOnly
            }
            (false, false) => {
                error!("All databases unavailable");
                HealthOutcome::NoneAvailable
            }
        }
    }
}
