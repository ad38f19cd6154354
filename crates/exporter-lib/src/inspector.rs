//! Container listing and inspection against the engine API

use crate::error::{ExporterError, Result};
use crate::models::{ContainerSummary, RawContainerRecord};
use crate::transport::{Dialer, SocketTransport, UnixSocketDialer};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Source of container inspection records for one scrape
#[async_trait]
pub trait ContainerSource: Send + Sync {
    /// IDs of all containers, including stopped ones, in engine order
    async fn list_container_ids(&self) -> Result<Vec<String>>;

    /// Full inspection document for one container
    async fn inspect_container(&self, id: &str) -> Result<RawContainerRecord>;

    /// List, then inspect every container one after another.
    ///
    /// The first failing inspect fails the whole fetch.
    async fn fetch_all(&self) -> Result<Vec<RawContainerRecord>> {
        let ids = self.list_container_ids().await?;
        let mut records = Vec::with_capacity(ids.len());
        for id in &ids {
            records.push(self.inspect_container(id).await?);
        }
        Ok(records)
    }
}

/// Docker engine API client speaking over a [`Dialer`]
pub struct DockerClient<D = UnixSocketDialer> {
    transport: SocketTransport<D>,
    api_version: Option<String>,
}

impl DockerClient<UnixSocketDialer> {
    /// Client for the engine socket at `path`
    pub fn unix(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self::new(SocketTransport::new(UnixSocketDialer::new(path)).with_timeout(timeout))
    }
}

impl<D: Dialer> DockerClient<D> {
    pub fn new(transport: SocketTransport<D>) -> Self {
        Self {
            transport,
            api_version: None,
        }
    }

    /// Pin requests to an API version, e.g. `v1.43`
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        let version = version.trim_matches('/');
        self.api_version = if version.is_empty() {
            None
        } else {
            Some(version.to_string())
        };
        self
    }

    fn endpoint(&self, path: &str) -> String {
        match &self.api_version {
            Some(version) => format!("/{}{}", version, path),
            None => path.to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let endpoint = self.endpoint(path);
        let body = self.transport.get(&endpoint).await?;
        serde_json::from_slice(&body).map_err(|e| {
            ExporterError::fetch_with(format!("malformed JSON from {}", endpoint), e)
        })
    }
}

#[async_trait]
impl<D: Dialer> ContainerSource for DockerClient<D> {
    async fn list_container_ids(&self) -> Result<Vec<String>> {
        let containers: Vec<ContainerSummary> = self.get_json("/containers/json?all=true").await?;
        debug!(count = containers.len(), "Listed containers");
        Ok(containers.into_iter().map(|c| c.id).collect())
    }

    async fn inspect_container(&self, id: &str) -> Result<RawContainerRecord> {
        self.get_json(&format!("/containers/{}/json", id)).await
    }
}
