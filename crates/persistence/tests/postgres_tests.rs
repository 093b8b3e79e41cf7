//! PostgreSQL primary integration tests.
//!
//! Connection string parsing runs without a database. The adapter tests use
//! testcontainers to start a real PostgreSQL instance in Docker; each test
//! gets its own database so counts and ids are isolated.
//!
//! Run with: `cargo test -p marquee-persistence --features postgres -- postgres`

#![cfg(feature = "postgres")]

mod common;

use marquee_persistence::backends::postgres::{PostgresConfig, is_postgres_url};

// ============================================================================
// Connection String Tests (no PostgreSQL instance required)
// ============================================================================

#[test]
fn test_postgres_config_defaults() {
    let config = PostgresConfig::default();
    assert_eq!(config.host, "localhost");
    assert_eq!(config.port, 5432);
    assert_eq!(config.dbname, "marquee");
    assert_eq!(config.user, "postgres");
    assert!(config.password.is_none());
}

#[test]
fn test_postgres_url_with_encoded_password_and_ipv6_host() {
    let config = PostgresConfig::from_url("postgresql://app:p%40ss%2Fw@[::1]:5433/movies").unwrap();
    assert_eq!(config.host, "::1");
    assert_eq!(config.port, 5433);
    assert_eq!(config.user, "app");
    assert_eq!(config.password.as_deref(), Some("p@ss/w"));
    assert_eq!(config.dbname, "movies");
}

#[test]
fn test_postgres_url_scheme_required() {
    assert!(is_postgres_url("postgres://localhost/movies"));
    assert!(!is_postgres_url("mysql://localhost/movies"));
    assert!(PostgresConfig::from_url("mysql://localhost/movies").is_err());
}

// ============================================================================
// Integration Tests (requires Docker for testcontainers)
// ============================================================================

/// Adapter tests against a real PostgreSQL instance.
///
/// Skip if no Docker:
///   cargo test -p marquee-persistence --features postgres -- --skip postgres_integration
#[cfg(test)]
mod postgres_integration {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{SubsecRound, Utc};
    use rust_decimal::Decimal;
    use testcontainers::ImageExt;
    use testcontainers::runners::AsyncRunner;
    use testcontainers_modules::postgres::Postgres;
    use tokio::sync::OnceCell;
    use tokio_postgres::NoTls;

    use marquee_persistence::backends::postgres::{PostgresBackend, PostgresConfig};
    use marquee_persistence::core::{MovieStorage, NetworkedStorage};
    use marquee_persistence::types::{Movie, PageRequest};

    use crate::common::{inception, rename, show};

    /// Shared PostgreSQL container reused across all tests in this module.
    struct SharedPg {
        host: String,
        port: u16,
        /// Kept alive for the duration of the test binary.
        _container: testcontainers::ContainerAsync<Postgres>,
    }

    static SHARED_PG: OnceCell<SharedPg> = OnceCell::const_new();
    static NEXT_DATABASE: AtomicUsize = AtomicUsize::new(0);

    async fn shared_pg() -> &'static SharedPg {
        SHARED_PG
            .get_or_init(|| async {
                let run_id = std::env::var("GITHUB_RUN_ID").unwrap_or_default();
                let container = Postgres::default()
                    .with_label("github.run_id", &run_id)
                    .start()
                    .await
                    .expect("Failed to start PostgreSQL container");

                let port = container
                    .get_host_port_ipv4(5432)
                    .await
                    .expect("Failed to get host port");
                let host = container
                    .get_host()
                    .await
                    .expect("Failed to get host")
                    .to_string();

                SharedPg {
                    host,
                    port,
                    _container: container,
                }
            })
            .await
    }

    /// Creates a fresh database on the shared container and connects to it.
    async fn create_backend() -> PostgresBackend {
        let pg = shared_pg().await;
        let dbname = format!(
            "marquee_{}_{}",
            std::process::id(),
            NEXT_DATABASE.fetch_add(1, Ordering::SeqCst)
        );

        let (client, connection) = tokio_postgres::connect(
            &format!(
                "host={} port={} user=postgres password=postgres dbname=postgres",
                pg.host, pg.port
            ),
            NoTls,
        )
        .await
        .expect("Failed to connect as admin");
        tokio::spawn(connection);
        client
            .batch_execute(&format!("CREATE DATABASE {}", dbname))
            .await
            .expect("Failed to create test database");

        let backend = PostgresBackend::connect_with_config(PostgresConfig {
            host: pg.host.clone(),
            port: pg.port,
            dbname,
            user: "postgres".to_string(),
            password: Some("postgres".to_string()),
            max_connections: 4,
            ..Default::default()
        })
        .await;
        assert!(
            backend.is_connected(),
            "connection failed: {:?}",
            backend.connection_error()
        );
        backend
    }

    // ========================================================================
    // CRUD Tests
    // ========================================================================

    #[tokio::test]
    async fn postgres_integration_create_then_get() {
        let backend = create_backend().await;

        let created = backend.create(inception()).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.title, "Inception");
        assert_eq!(created.duration, Some(148));
        assert_eq!(created.created_at, created.updated_at);
        assert_eq!(created.created_at.timestamp_subsec_nanos() % 1_000_000, 0);

        let read = backend.get(created.id).await.unwrap();
        assert_eq!(read, Some(created));
    }

    #[tokio::test]
    async fn postgres_integration_budget_keeps_two_decimals() {
        let backend = create_backend().await;
        let mut input = inception();
        input.budget = Some(Decimal::new(1_600_000_050, 2));

        let created = backend.create(input).await.unwrap();
        assert_eq!(created.budget, Some(Decimal::new(1_600_000_050, 2)));
    }

    #[tokio::test]
    async fn postgres_integration_list_newest_first_with_total() {
        let backend = create_backend().await;
        for title in ["A", "B", "C"] {
            backend.create(show(title)).await.unwrap();
        }

        let first = backend.list(PageRequest::new(1, 2)).await.unwrap();
        assert_eq!(first.total, 3);
        let titles: Vec<_> = first.data.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "B"]);

        let second = backend.list(PageRequest::new(2, 2)).await.unwrap();
        assert_eq!(second.total, 3);
        assert_eq!(second.data.len(), 1);
        assert_eq!(second.data[0].title, "A");
    }

    #[tokio::test]
    async fn postgres_integration_update_rereads_row() {
        let backend = create_backend().await;
        let created = backend.create(inception()).await.unwrap();

        let updated = backend
            .update(created.id, rename("Inception (Director's Cut)"))
            .await
            .unwrap()
            .expect("row should exist");
        assert_eq!(updated.title, "Inception (Director's Cut)");
        assert_eq!(updated.director, created.director);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn postgres_integration_update_unknown_id_is_absent() {
        let backend = create_backend().await;
        assert!(backend.update(9999, rename("Nobody")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn postgres_integration_delete_twice() {
        let backend = create_backend().await;
        let created = backend.create(show("Gone")).await.unwrap();

        assert!(backend.delete(created.id).await.unwrap());
        assert!(!backend.delete(created.id).await.unwrap());
        assert!(backend.get(created.id).await.unwrap().is_none());
    }

    // ========================================================================
    // Mirroring Tests
    // ========================================================================

    #[tokio::test]
    async fn postgres_integration_upsert_keeps_id_and_advances_sequence() {
        let backend = create_backend().await;
        let now = Utc::now().trunc_subsecs(3);
        let mirrored = Movie::from_new(100, inception(), now);

        backend.upsert(&mirrored).await.unwrap();
        assert_eq!(backend.get(100).await.unwrap(), Some(mirrored.clone()));

        // Upserting again replaces in place.
        let mut renamed = mirrored.clone();
        renamed.title = "Renamed".to_string();
        backend.upsert(&renamed).await.unwrap();
        assert_eq!(backend.get(100).await.unwrap().unwrap().title, "Renamed");

        let fresh = backend.create(show("Fresh")).await.unwrap();
        assert!(fresh.id > 100);
    }

    #[tokio::test]
    async fn postgres_integration_verify_connection() {
        let backend = create_backend().await;
        backend.verify_connection().await.unwrap();
    }
}
