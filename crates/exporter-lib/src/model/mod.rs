//! Typed metric model built fresh for every scrape
//!
//! A [`MetricModel`] maps metric names to series in insertion order, and
//! each sample keeps its labels in insertion order, so rendering the same
//! input always yields the same text.

mod builder;
mod timestamp;

pub use builder::{build, metric_names};
pub use timestamp::{parse_timestamp, ZERO_TIMESTAMP};

use indexmap::IndexMap;
use std::fmt;

/// Label name to label value, in insertion order
pub type LabelSet = IndexMap<String, String>;

/// Prometheus metric type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Gauge,
    Counter,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Gauge => "gauge",
            MetricType::Counter => "counter",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation with its labels
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub value: i64,
    pub labels: LabelSet,
}

impl MetricSample {
    pub fn new(value: i64, labels: LabelSet) -> Self {
        Self { value, labels }
    }
}

/// A named metric with fixed type and help text
#[derive(Debug, Clone)]
pub struct MetricSeries {
    metric_type: MetricType,
    help: &'static str,
    samples: Vec<MetricSample>,
}

impl MetricSeries {
    pub fn new(metric_type: MetricType, help: &'static str) -> Self {
        Self {
            metric_type,
            help,
            samples: Vec::new(),
        }
    }

    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    pub fn help(&self) -> &str {
        self.help
    }

    pub fn samples(&self) -> &[MetricSample] {
        &self.samples
    }

    pub fn push(&mut self, sample: MetricSample) {
        self.samples.push(sample);
    }
}

/// All series of one scrape, keyed by metric name
#[derive(Debug, Clone, Default)]
pub struct MetricModel {
    series: IndexMap<String, MetricSeries>,
}

impl MetricModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a series; an existing series of the same name is kept as is
    pub fn declare(&mut self, name: impl Into<String>, metric_type: MetricType, help: &'static str) {
        self.series
            .entry(name.into())
            .or_insert_with(|| MetricSeries::new(metric_type, help));
    }

    pub fn get(&self, name: &str) -> Option<&MetricSeries> {
        self.series.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut MetricSeries> {
        self.series.get_mut(name)
    }

    /// Series in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricSeries)> {
        self.series.iter().map(|(name, series)| (name.as_str(), series))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_keeps_declaration_order() {
        let mut model = MetricModel::new();
        model.declare("zeta", MetricType::Gauge, "z");
        model.declare("alpha", MetricType::Counter, "a");

        let names: Vec<_> = model.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_redeclare_does_not_reset_samples() {
        let mut model = MetricModel::new();
        model.declare("up", MetricType::Gauge, "help");
        model
            .get_mut("up")
            .unwrap()
            .push(MetricSample::new(1, LabelSet::new()));
        model.declare("up", MetricType::Counter, "other");

        let series = model.get("up").unwrap();
        assert_eq!(series.samples().len(), 1);
        assert_eq!(series.metric_type(), MetricType::Gauge);
    }

    #[test]
    fn test_metric_type_renders_lowercase() {
        assert_eq!(MetricType::Gauge.to_string(), "gauge");
        assert_eq!(MetricType::Counter.to_string(), "counter");
    }
}
