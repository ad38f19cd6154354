//! One scrape: fetch, build, compile
//!
//! Nothing survives between scrapes. Each call lists and inspects every
//! container afresh and renders a new model.

use crate::error::Result;
use crate::exposition::compile;
use crate::inspector::ContainerSource;
use crate::model::build;
use crate::observability::ExporterMetrics;
use std::sync::Arc;
use std::time::Instant;

/// Rendered output of a successful scrape
#[derive(Debug, Clone)]
pub struct ScrapeOutput {
    pub body: String,
    pub containers: usize,
}

/// Run the acquisition-and-exposition pipeline once against `source`
pub async fn collect(source: &dyn ContainerSource) -> Result<ScrapeOutput> {
    let records = source.fetch_all().await?;
    let model = build(&records)?;
    Ok(ScrapeOutput {
        body: compile(&model),
        containers: records.len(),
    })
}

/// The scrape function handed to the server
#[derive(Clone)]
pub struct ScrapePipeline {
    source: Arc<dyn ContainerSource>,
    self_metrics: Option<ExporterMetrics>,
}

impl ScrapePipeline {
    pub fn new(source: Arc<dyn ContainerSource>) -> Self {
        Self {
            source,
            self_metrics: None,
        }
    }

    /// Append exporter self-metrics to every successful scrape
    pub fn with_self_metrics(mut self, metrics: ExporterMetrics) -> Self {
        self.self_metrics = Some(metrics);
        self
    }

    pub async fn scrape(&self) -> Result<ScrapeOutput> {
        let start = Instant::now();
        let result = collect(self.source.as_ref()).await;

        let Some(metrics) = &self.self_metrics else {
            return result;
        };

        match result {
            Ok(mut output) => {
                metrics.observe_scrape(start.elapsed(), output.containers);
                output.body.push('\n');
                output.body.push_str(metrics.encode().trim_end());
                Ok(output)
            }
            Err(e) => {
                metrics.observe_failure(start.elapsed());
                Err(e)
            }
        }
    }
}
