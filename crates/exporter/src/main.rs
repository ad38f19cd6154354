//! Docker Status Exporter
//!
//! Serves the lifecycle state of every container on the local Docker
//! engine as Prometheus metrics, collected fresh on each scrape.

use anyhow::Result;
use clap::Parser;
use docker_status_exporter::{
    api,
    config::{Cli, ExporterConfig},
    logging,
};
use docker_status_lib::{DockerClient, ExporterMetrics, ScrapePipeline, StructuredLogger};
use std::sync::Arc;
use tracing::info;

const EXPORTER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ExporterConfig::load(&cli)?;

    logging::init(config.log_format);
    info!(
        socket_path = %config.socket_path.display(),
        timeout_secs = config.request_timeout_secs,
        self_metrics = config.self_metrics,
        "Exporter configured"
    );

    let mut client = DockerClient::unix(&config.socket_path, config.request_timeout());
    if let Some(version) = &config.api_version {
        client = client.with_api_version(version.as_str());
    }

    let mut pipeline = ScrapePipeline::new(Arc::new(client));
    if config.self_metrics {
        pipeline = pipeline.with_self_metrics(ExporterMetrics::new()?);
    }

    let logger = StructuredLogger::new(config.socket_path.display().to_string());
    let addr = config.listen_addr();
    logger.log_startup(EXPORTER_VERSION, &addr);

    let app_state = Arc::new(api::AppState::new(pipeline, logger.clone()));
    api::serve(&addr, app_state, shutdown_signal(logger)).await
}

/// Resolve on SIGINT or SIGTERM
async fn shutdown_signal(logger: StructuredLogger) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => logger.log_shutdown("SIGINT received"),
        _ = terminate => logger.log_shutdown("SIGTERM received"),
    }
}
