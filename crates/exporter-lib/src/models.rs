//! Raw engine documents consumed by the exporter

use serde::Deserialize;
use serde_json::Value;

/// One entry of `GET /containers/json`; only the ID is needed
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerSummary {
    #[serde(rename = "Id")]
    pub id: String,
}

/// The subset of `GET /containers/{id}/json` the exporter reads
///
/// Numeric, boolean and timestamp fields stay as raw JSON values so that a
/// malformed value surfaces as a parse error while building metrics rather than as a
/// fetch error.
#[derive(Debug, Clone, Deserialize)]
pub struct RawContainerRecord {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "RestartCount", default)]
    pub restart_count: Value,
    #[serde(rename = "Created", default)]
    pub created: Value,
    #[serde(rename = "State")]
    pub state: RawContainerState,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawContainerState {
    #[serde(rename = "OOMKilled", default)]
    pub oom_killed: Value,
    #[serde(rename = "Running", default)]
    pub running: Value,
    #[serde(rename = "Paused", default)]
    pub paused: Value,
    #[serde(rename = "Restarting", default)]
    pub restarting: Value,
    #[serde(rename = "Dead", default)]
    pub dead: Value,
    #[serde(rename = "ExitCode", default)]
    pub exit_code: Value,
    #[serde(rename = "StartedAt", default)]
    pub started_at: Value,
    #[serde(rename = "FinishedAt", default)]
    pub finished_at: Value,
}

impl RawContainerRecord {
    /// Display name with the engine's leading `/` removed
    pub fn display_name(&self) -> &str {
        self.name.strip_prefix('/').unwrap_or(&self.name)
    }
}
