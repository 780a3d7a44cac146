//! OpenRouter Exporter - Entry Point
//!
//! Runs the metrics server and the credits poll loop until interrupted.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use openrouter_exporter::api::CreditsClient;
use openrouter_exporter::config::Args;
use openrouter_exporter::metrics::{ExporterMetrics, MetricsServer};
use openrouter_exporter::{Config, Watcher, VERSION};

/// Application entry point
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing/logging
    openrouter_exporter::util::init_tracing(&args.logging())?;

    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    info!(
        version = VERSION,
        api_endpoint = %config.api.endpoint,
        interval = ?config.interval,
        "Starting OpenRouter Exporter"
    );

    let metrics = Arc::new(ExporterMetrics::new().context("Failed to build metrics registry")?);

    let server = match MetricsServer::bind(&config.exporter, metrics.clone()).await {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "Failed to start metrics server");
            return Err(e.into());
        }
    };
    info!(
        address = %config.exporter.bind_addr,
        endpoint = %config.exporter.path,
        "Metrics server started"
    );

    let client = CreditsClient::new(&config.api)?;
    let watcher = Watcher::new(client, metrics, config.interval);

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            info!("Shutdown signal received");
            cancel.cancel();
        }
    });

    tokio::select! {
        result = server.serve() => {
            let e = match result {
                Ok(()) => anyhow::anyhow!("metrics server exited unexpectedly"),
                Err(e) => e.into(),
            };
            error!(error = %e, "Metrics server error");
            return Err(e);
        }
        _ = watcher.run(cancel) => {}
    }

    info!("Exporter stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
