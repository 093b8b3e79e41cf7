//! Marquee
//!
//! A movie catalog server with a PostgreSQL primary, a MongoDB replica and
//! an in-memory fallback.

use clap::Parser;
use marquee_persistence::composite::{
    ActiveStorage, HealthMonitor, HealthOutcome, build_storage,
};
use marquee_rest::{ServerConfig, create_app_with_config, init_logging};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Logs the health monitor's final decision once it settles.
fn report_health(monitor: JoinHandle<HealthOutcome>) {
    tokio::spawn(async move {
        match monitor.await {
            Ok(outcome) => info!(?outcome, "Storage health check settled"),
            Err(e) => error!(error = %e, "Storage health monitor stopped unexpectedly"),
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        use_postgres = config.use_postgres,
        use_mongodb = config.use_mongodb,
        "Starting Marquee"
    );

    let selection = build_storage(&config.storage_settings()).await;
    info!(storage = %selection.kind(), "Storage selected");

    // Requests are served right away; the monitor swaps the backend in place
    // if its checks fail.
    let active = ActiveStorage::new(selection.initial_backend());
    let monitor = HealthMonitor::new(config.health_config(), selection, active.clone());
    report_health(monitor.spawn());

    let app = create_app_with_config(active, config.clone());
    serve(app, &config).await
}
