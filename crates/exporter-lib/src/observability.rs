//! Observability for the exporter itself
//!
//! Provides:
//! - Optional Prometheus self-metrics (scrape latency, scrape and error counts)
//! - Structured logging of lifecycle and scrape events with tracing

use crate::error::ExporterError;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder,
};
use std::error::Error;
use std::time::Duration;
use tracing::{error, info, warn};

/// Histogram buckets for scrape duration (in seconds)
const SCRAPE_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Exporter self-metrics held in a private registry
///
/// Clones share the same underlying metrics.
#[derive(Clone)]
pub struct ExporterMetrics {
    registry: Registry,
    scrape_duration_seconds: Histogram,
    scrapes: IntCounter,
    scrape_errors: IntCounter,
    containers: IntGauge,
}

impl ExporterMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let scrape_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "docker_status_exporter_scrape_duration_seconds",
                "Time spent collecting and rendering container status metrics",
            )
            .buckets(SCRAPE_BUCKETS.to_vec()),
        )?;
        let scrapes = IntCounter::new(
            "docker_status_exporter_scrapes_total",
            "Total number of scrapes served",
        )?;
        let scrape_errors = IntCounter::new(
            "docker_status_exporter_scrape_errors_total",
            "Total number of scrapes that failed",
        )?;
        let containers = IntGauge::new(
            "docker_status_exporter_containers",
            "Number of containers seen by the last successful scrape",
        )?;

        registry.register(Box::new(scrape_duration_seconds.clone()))?;
        registry.register(Box::new(scrapes.clone()))?;
        registry.register(Box::new(scrape_errors.clone()))?;
        registry.register(Box::new(containers.clone()))?;

        Ok(Self {
            registry,
            scrape_duration_seconds,
            scrapes,
            scrape_errors,
            containers,
        })
    }

    /// Record a successful scrape
    pub fn observe_scrape(&self, duration: Duration, containers: usize) {
        self.scrapes.inc();
        self.scrape_duration_seconds.observe(duration.as_secs_f64());
        self.containers.set(containers as i64);
    }

    /// Record a failed scrape
    pub fn observe_failure(&self, duration: Duration) {
        self.scrapes.inc();
        self.scrape_errors.inc();
        self.scrape_duration_seconds.observe(duration.as_secs_f64());
    }

    /// Render the self-metrics in text format; empty if encoding fails
    pub fn encode(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            warn!(error = %e, "Failed to encode exporter self-metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

/// Structured logger for exporter events
#[derive(Clone)]
pub struct StructuredLogger {
    socket_path: String,
}

impl StructuredLogger {
    pub fn new(socket_path: impl Into<String>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    /// Log exporter startup
    pub fn log_startup(&self, version: &str, listen_addr: &str) {
        info!(
            event = "exporter_started",
            version = %version,
            listen_addr = %listen_addr,
            socket_path = %self.socket_path,
            "Docker status exporter started"
        );
    }

    /// Log exporter shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "exporter_shutdown",
            reason = %reason,
            "Docker status exporter shutting down"
        );
    }

    /// Log a completed scrape
    pub fn log_scrape(&self, containers: usize, duration: Duration) {
        info!(
            event = "scrape_completed",
            containers = containers,
            duration_ms = duration.as_millis() as u64,
            "Served container status metrics"
        );
    }

    /// Log a failed scrape with the full error chain
    pub fn log_scrape_failure(&self, err: &ExporterError, duration: Duration) {
        error!(
            event = "scrape_failed",
            kind = err.kind(),
            socket_path = %self.socket_path,
            duration_ms = duration.as_millis() as u64,
            error = %error_chain(err),
            "Failed to collect container status metrics"
        );
    }
}

fn error_chain(err: &ExporterError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
