//! Health monitor decisions, run on a paused clock.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{ALWAYS, MockBackend, inception};
use marquee_persistence::composite::{
    ActiveStorage, FailoverStorage, HealthConfig, HealthMonitor, HealthOutcome, StorageSelection,
    probe_with_retry,
};
use marquee_persistence::core::{BackendKind, MovieStorage};
use tokio::time::Instant;

struct Combined {
    primary: Arc<MockBackend>,
    replica: Arc<MockBackend>,
    failover: Arc<FailoverStorage>,
    active: ActiveStorage,
    monitor: HealthMonitor,
}

fn combined() -> Combined {
    let primary = MockBackend::primary();
    let replica = MockBackend::replica();
    let failover = Arc::new(FailoverStorage::new(primary.clone(), replica.clone()));
    let selection = StorageSelection::Combined(Arc::clone(&failover));
    let active = ActiveStorage::new(selection.initial_backend());
    let monitor = HealthMonitor::new(HealthConfig::default(), selection, active.clone());
    Combined {
        primary,
        replica,
        failover,
        active,
        monitor,
    }
}

// ============================================================================
// Probing
// ============================================================================

/// Test that a probe succeeding on the third attempt waits two retry delays.
#[tokio::test(start_paused = true)]
async fn test_probe_retries_until_success() {
    let backend = MockBackend::primary();
    backend.fail_probes(2);
    let start = Instant::now();

    let attempt = probe_with_retry(backend.as_ref(), &HealthConfig::default())
        .await
        .unwrap();

    assert_eq!(attempt, 3);
    assert_eq!(backend.probe_calls(), 3);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(1000) && elapsed < Duration::from_millis(1100));
}

/// Test that a probe gives up after the configured number of attempts.
#[tokio::test(start_paused = true)]
async fn test_probe_gives_up() {
    let backend = MockBackend::replica();
    backend.fail_probes(ALWAYS);
    let config = HealthConfig::default().with_attempts(3);

    let err = probe_with_retry(backend.as_ref(), &config).await.unwrap_err();

    assert!(err.is_unavailable());
    assert_eq!(backend.probe_calls(), 3);
}

// ============================================================================
// Combined selection
// ============================================================================

/// Test that two healthy backends keep the coordinator active.
#[tokio::test(start_paused = true)]
async fn test_both_available() {
    let setup = combined();

    let outcome = setup.monitor.run().await;

    assert_eq!(outcome, HealthOutcome::BothAvailable);
    assert_eq!(setup.active.current().kind(), BackendKind::Failover);
    assert!(setup.failover.primary_available());
    assert!(setup.failover.replica_available());
    assert_eq!(setup.primary.probe_calls(), 1);
    assert_eq!(setup.replica.probe_calls(), 1);
}

/// Test that a dead primary hands the active storage to the bare replica.
#[tokio::test(start_paused = true)]
async fn test_replica_only_replaces_active_storage() {
    let setup = combined();
    setup.primary.go_down();

    let outcome = setup.monitor.run().await;

    assert_eq!(outcome, HealthOutcome::ReplicaOnly);
    assert_eq!(setup.primary.probe_calls(), 5);
    assert_eq!(setup.active.current().kind(), BackendKind::MongoDB);

    let created = setup.active.create(inception()).await.unwrap();
    assert_eq!(setup.replica.store().get(created.id).await.unwrap(), Some(created));
    assert_eq!(setup.primary.op_calls(), 0);
}

/// Test that a dead replica is re-checked until it comes back.
#[tokio::test(start_paused = true)]
async fn test_primary_only_rechecks_replica() {
    let setup = combined();
    // Fails every attempt of the first pass only.
    setup.replica.fail_probes(5);

    let first = setup.monitor.check_once().await;
    assert_eq!(first, HealthOutcome::PrimaryOnly);
    assert!(setup.failover.primary_available());
    assert!(!setup.failover.replica_available());
    assert_eq!(setup.active.current().kind(), BackendKind::Failover);

    let outcome = setup.monitor.run().await;
    assert_eq!(outcome, HealthOutcome::BothAvailable);
    assert!(setup.failover.replica_available());
}

/// Test that the background task keeps checking until the replica recovers.
#[tokio::test(start_paused = true)]
async fn test_spawned_monitor_recovers_replica() {
    let setup = combined();
    // First pass exhausts its five attempts, the second pass fails twice more.
    setup.replica.fail_probes(7);

    let outcome = setup.monitor.spawn().await.unwrap();

    assert_eq!(outcome, HealthOutcome::BothAvailable);
    assert_eq!(setup.replica.probe_calls(), 8);
    assert!(setup.failover.replica_available());
}

/// Test that both flags drop when neither backend answers.
#[tokio::test(start_paused = true)]
async fn test_none_available() {
    let setup = combined();
    setup.primary.go_down();
    setup.replica.go_down();

    let outcome = setup.monitor.check_once().await;

    assert_eq!(outcome, HealthOutcome::NoneAvailable);
    assert!(outcome.needs_recheck());
    assert!(!setup.failover.primary_available());
    assert!(!setup.failover.replica_available());
    assert_eq!(setup.active.current().kind(), BackendKind::Failover);

    // Requests still succeed from memory.
    setup.active.create(inception()).await.unwrap();
    assert!(setup.failover.fallback_in_use());
}

// ============================================================================
// Single backend
// ============================================================================

/// Test that a healthy single backend stays active.
#[tokio::test(start_paused = true)]
async fn test_single_backend_healthy() {
    let primary = MockBackend::primary();
    primary.fail_probes(1);
    let selection = StorageSelection::Primary(primary.clone());
    let active = ActiveStorage::new(selection.initial_backend());

    let outcome = HealthMonitor::new(HealthConfig::default(), selection, active.clone())
        .run()
        .await;

    assert_eq!(outcome, HealthOutcome::SingleBackendHealthy);
    assert_eq!(primary.probe_calls(), 2);
    assert_eq!(active.current().kind(), BackendKind::Postgres);
}

/// Test that an unreachable single backend is replaced by memory.
#[tokio::test(start_paused = true)]
async fn test_single_backend_degrades_to_memory() {
    let replica = MockBackend::replica();
    replica.go_down();
    let selection = StorageSelection::Replica(replica.clone());
    let active = ActiveStorage::new(selection.initial_backend());
    let config = HealthConfig::default().with_retry_delay(Duration::from_millis(100));
    let start = Instant::now();

    let outcome = HealthMonitor::new(config, selection, active.clone()).run().await;

    assert_eq!(outcome, HealthOutcome::DegradedToMemory);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(400) && elapsed < Duration::from_millis(500));
    assert_eq!(active.current().kind(), BackendKind::Memory);

    let created = active.create(inception()).await.unwrap();
    assert_eq!(created.id, 1);
    assert_eq!(replica.op_calls(), 0);
}
