//! Maps inspection records onto the fixed container status schema

use super::timestamp::parse_timestamp;
use super::{LabelSet, MetricModel, MetricSample, MetricType};
use crate::error::{ExporterError, Result};
use crate::models::RawContainerRecord;
use serde_json::Value;

pub mod metric_names {
    pub const STATE: &str = "container_status_state";
    pub const EXIT_CODE: &str = "container_status_exit_code";
    pub const RESTART_COUNT: &str = "container_status_restart_count";
    pub const STARTED_SECONDS: &str = "container_status_started_seconds";
    pub const FINISHED_SECONDS: &str = "container_status_finished_seconds";
    pub const CREATED_SECONDS: &str = "container_status_created_seconds";
}

use metric_names::*;

const SCHEMA: [(&str, MetricType, &str); 6] = [
    (
        STATE,
        MetricType::Gauge,
        "Container state flags (1 if the status is set, 0 otherwise)",
    ),
    (
        EXIT_CODE,
        MetricType::Gauge,
        "Exit code of the container's last run",
    ),
    (
        RESTART_COUNT,
        MetricType::Counter,
        "Number of times the container has been restarted",
    ),
    (
        STARTED_SECONDS,
        MetricType::Gauge,
        "Unix time the container was last started, 0 if never",
    ),
    (
        FINISHED_SECONDS,
        MetricType::Gauge,
        "Unix time the container last finished, 0 if never",
    ),
    (
        CREATED_SECONDS,
        MetricType::Gauge,
        "Unix time the container was created",
    ),
];

/// Build the full status model from inspection records, in input order.
///
/// All six series are present even for an empty input. Any malformed field
/// fails the whole build.
pub fn build(records: &[RawContainerRecord]) -> Result<MetricModel> {
    let mut model = MetricModel::new();
    for (name, metric_type, help) in SCHEMA {
        model.declare(name, metric_type, help);
    }

    for record in records {
        add_container(&mut model, record)?;
    }

    Ok(model)
}

fn add_container(model: &mut MetricModel, record: &RawContainerRecord) -> Result<()> {
    let state = &record.state;
    let context = |field: &str| format!("{} of container {}", field, record.id);

    // Convert everything first so a bad field leaves no samples behind
    let flags = [
        ("oom_killed", flag(&state.oom_killed, &context("State.OOMKilled"))?),
        ("running", flag(&state.running, &context("State.Running"))?),
        ("paused", flag(&state.paused, &context("State.Paused"))?),
        ("restarting", flag(&state.restarting, &context("State.Restarting"))?),
        ("dead", flag(&state.dead, &context("State.Dead"))?),
    ];
    let exit_code = integer(&state.exit_code, &context("State.ExitCode"))?;
    let restart_count = integer(&record.restart_count, &context("RestartCount"))?;
    if restart_count < 0 {
        return Err(ExporterError::parse(format!(
            "negative {}: {}",
            context("RestartCount"),
            restart_count
        )));
    }
    let started = timestamp(&state.started_at, &context("State.StartedAt"))?;
    let finished = timestamp(&state.finished_at, &context("State.FinishedAt"))?;
    let created = timestamp(&record.created, &context("Created"))?;

    let mut base = LabelSet::new();
    base.insert("id".to_string(), record.id.clone());
    base.insert("name".to_string(), record.display_name().to_string());

    for (status, value) in flags {
        let mut labels = LabelSet::with_capacity(3);
        labels.insert("status".to_string(), status.to_string());
        labels.extend(base.clone());
        push(model, STATE, value, labels)?;
    }

    push(model, EXIT_CODE, exit_code, base.clone())?;
    push(model, RESTART_COUNT, restart_count, base.clone())?;
    push(model, STARTED_SECONDS, started, base.clone())?;
    push(model, FINISHED_SECONDS, finished, base.clone())?;
    push(model, CREATED_SECONDS, created, base)?;

    Ok(())
}

fn push(model: &mut MetricModel, name: &str, value: i64, labels: LabelSet) -> Result<()> {
    let series = model
        .get_mut(name)
        .ok_or_else(|| ExporterError::parse(format!("no series declared for {name}")))?;
    series.push(MetricSample::new(value, labels));
    Ok(())
}

/// Booleans, or the integers 0 and 1
fn flag(value: &Value, what: &str) -> Result<i64> {
    let parsed = match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Number(n) => n.as_i64().filter(|v| matches!(v, 0 | 1)),
        _ => None,
    };
    parsed.ok_or_else(|| ExporterError::parse(format!("{what} is not a boolean: {value}")))
}

fn integer(value: &Value, what: &str) -> Result<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ExporterError::parse(format!("{what} is not an integer: {value}")))
}

fn timestamp(value: &Value, what: &str) -> Result<i64> {
    let text = value
        .as_str()
        .ok_or_else(|| ExporterError::parse(format!("{what} is not a timestamp string: {value}")))?;
    parse_timestamp(text).map_err(|e| ExporterError::parse(format!("{what}: {e}")))
}
