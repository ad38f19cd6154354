//! Docker container status exporter library
//!
//! This crate provides the scrape pipeline behind the exporter:
//! - HTTP over the engine's Unix domain socket
//! - Container listing and inspection
//! - The container status metric model and its builder
//! - Prometheus text exposition
//! - Self-metrics and structured logging

pub mod error;
pub mod exposition;
pub mod inspector;
pub mod model;
pub mod models;
pub mod observability;
pub mod pipeline;
pub mod transport;

pub use error::{ExporterError, Result};
pub use exposition::compile;
pub use inspector::{ContainerSource, DockerClient};
pub use model::{build, parse_timestamp, MetricModel, MetricSample, MetricSeries, MetricType};
pub use models::{RawContainerRecord, RawContainerState};
pub use observability::{ExporterMetrics, StructuredLogger};
pub use pipeline::{collect, ScrapeOutput, ScrapePipeline};
pub use transport::{Dialer, SocketTransport, UnixSocketDialer, DEFAULT_SOCKET_PATH};
