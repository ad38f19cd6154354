//! HTTP scrape endpoint

use anyhow::Context;
use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use docker_status_lib::{ScrapePipeline, StructuredLogger};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

const TEXT_PLAIN: &str = "text/plain";

/// Body of every failed scrape; details go to the log only
pub const INTERNAL_ERROR_BODY: &str = "Something went wrong.";

pub const NOT_FOUND_BODY: &str = "Not found";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: ScrapePipeline,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(pipeline: ScrapePipeline, logger: StructuredLogger) -> Self {
        Self { pipeline, logger }
    }
}

/// Prometheus metrics endpoint, collected fresh on every request
async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    let start = Instant::now();

    match state.pipeline.scrape().await {
        Ok(output) => {
            state.logger.log_scrape(output.containers, start.elapsed());
            (StatusCode::OK, [(CONTENT_TYPE, TEXT_PLAIN)], output.body).into_response()
        }
        Err(e) => {
            state.logger.log_scrape_failure(&e, start.elapsed());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(CONTENT_TYPE, TEXT_PLAIN)],
                INTERNAL_ERROR_BODY,
            )
                .into_response()
        }
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, [(CONTENT_TYPE, TEXT_PLAIN)], NOT_FOUND_BODY)
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .fallback(not_found)
        .with_state(state)
}

/// Start the API server and run until `shutdown` resolves
pub async fn serve<F>(addr: &str, state: Arc<AppState>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(addr = %addr, "Starting metrics server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
