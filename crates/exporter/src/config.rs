//! Exporter configuration
//!
//! Sources, later ones winning: built-in defaults, an optional config file,
//! `EXPORTER_*` environment variables, then command-line flags.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use docker_status_lib::DEFAULT_SOCKET_PATH;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines (default)
    #[default]
    Json,
    /// Human-readable text
    Text,
}

/// Exporter configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExporterConfig {
    /// TCP port for the metrics endpoint
    #[serde(default = "default_port")]
    pub port: u16,

    /// Address to bind the metrics endpoint on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Path of the Docker engine socket
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,

    /// Bound on dialing the engine and on each engine request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Engine API version prefix such as `v1.43`; unversioned if unset
    #[serde(default)]
    pub api_version: Option<String>,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Append exporter self-metrics to the scrape output
    #[serde(default)]
    pub self_metrics: bool,
}

fn default_port() -> u16 {
    8080
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_socket_path() -> PathBuf {
    PathBuf::from(DEFAULT_SOCKET_PATH)
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            socket_path: default_socket_path(),
            request_timeout_secs: default_request_timeout(),
            api_version: None,
            log_format: LogFormat::default(),
            self_metrics: false,
        }
    }
}

/// Command-line flags
#[derive(Debug, Default, Parser)]
#[command(name = "docker-status-exporter")]
#[command(version, about = "Expose Docker container status as Prometheus metrics", long_about = None)]
pub struct Cli {
    /// Config file (TOML, YAML or JSON)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Port for the metrics endpoint
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Address to bind the metrics endpoint on
    #[arg(long)]
    pub bind_address: Option<String>,

    /// Path of the Docker engine socket
    #[arg(long)]
    pub socket_path: Option<PathBuf>,

    /// Engine request timeout in seconds
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Engine API version prefix, e.g. v1.43
    #[arg(long)]
    pub api_version: Option<String>,

    /// Log output format
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// Append exporter self-metrics to the scrape output
    #[arg(long)]
    pub self_metrics: bool,
}

impl ExporterConfig {
    /// Load configuration from the config file, environment and flags
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = &cli.config {
            builder = builder.add_source(config::File::from(path.as_path()));
        }
        let config = builder
            .add_source(config::Environment::with_prefix("EXPORTER"))
            .build()
            .context("Failed to read configuration")?;

        let mut loaded: ExporterConfig = config
            .try_deserialize()
            .context("Invalid configuration")?;
        loaded.apply_cli(cli);
        Ok(loaded)
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(addr) = &cli.bind_address {
            self.bind_address = addr.clone();
        }
        if let Some(path) = &cli.socket_path {
            self.socket_path = path.clone();
        }
        if let Some(secs) = cli.request_timeout_secs {
            self.request_timeout_secs = secs;
        }
        if let Some(version) = &cli.api_version {
            self.api_version = Some(version.clone());
        }
        if let Some(format) = cli.log_format {
            self.log_format = format;
        }
        if cli.self_metrics {
            self.self_metrics = true;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
