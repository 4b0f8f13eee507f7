//! SkyNotify - host resource monitor
//!
//! Polls cpu, memory, disk and temperature, analyzes trends and anomalies
//! and raises debounced alerts. Serves health, metrics and the latest
//! analysis over HTTP.

use monitor_lib::{
    collector::{MonitorLoopBuilder, StatusBoard, SystemCollector},
    health::{components, HealthRegistry},
    observability::{MonitorMetrics, StructuredLogger},
    Analyzer,
};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const MONITOR_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting skynotify");

    // Load configuration
    let config = config::DaemonConfig::load()?;
    info!(
        host_name = %config.host_name,
        disk_mount = %config.disk_mount.display(),
        "Monitor configured"
    );

    // Initialize health registry
    let health_registry = HealthRegistry::new();
    health_registry.register(components::COLLECTOR).await;
    health_registry.register(components::ANALYZER).await;
    health_registry.register(components::NOTIFIER).await;

    // Register metrics before the first scrape
    let _metrics = MonitorMetrics::new();

    let logger = StructuredLogger::new(&config.host_name);
    logger.log_startup(MONITOR_VERSION, config.check_interval_secs);

    let board = StatusBoard::new();
    let analyzer = Analyzer::new(config.monitor.clone())?;
    let monitor = MonitorLoopBuilder::new()
        .collector(Arc::new(SystemCollector::new(&config.disk_mount)))
        .analyzer(analyzer)
        .board(board.clone())
        .health(health_registry.clone())
        .interval(Duration::from_secs(config.check_interval_secs))
        .host_name(&config.host_name)
        .build()?;

    let (shutdown_tx, _) = broadcast::channel(1);
    let loop_handle = tokio::spawn(monitor.run(shutdown_tx.subscribe()));

    // Start health, metrics and status server
    let app_state = Arc::new(api::AppState::new(health_registry, board));
    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    // Wait for shutdown signal
    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
        }
        served = api_handle => {
            match served {
                Ok(Ok(())) => logger.log_shutdown("API server stopped"),
                Ok(Err(e)) => error!(error = %e, "API server failed"),
                Err(e) => error!(error = %e, "API server task panicked"),
            }
        }
    }

    // Receivers may already be gone if the loop exited
    let _ = shutdown_tx.send(());
    if let Err(e) = loop_handle.await {
        error!(error = %e, "Monitor loop task failed");
    }

    info!("Shutting down");
    Ok(())
}
