//! Metrics endpoint handler for Prometheus scraping.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::time::Instant;
use tracing::{debug, error, instrument};

use crate::state::SharedState;

/// Error type for metrics endpoint failures.
#[derive(Debug)]
pub enum MetricsError {
    EncodingFailed,
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to encode metrics",
        )
            .into_response()
    }
}

/// Handler for the /metrics endpoint.
#[instrument(skip(state))]
pub async fn metrics_handler(State(state): State<SharedState>) -> Result<String, MetricsError> {
    let start = Instant::now();

    let body = state.metrics.scrape(&state.collector).map_err(|e| {
        error!("Failed to encode Prometheus metrics: {}", e);
        MetricsError::EncodingFailed
    })?;

    debug!(
        "Metrics request completed: {} bytes, {:.3}ms",
        body.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(body)
}
