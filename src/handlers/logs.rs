//! Log record endpoints.
//!
//! `GET /logs` returns the newest records passing a filter; `DELETE /logs`
//! empties the store when the configuration allows it.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use herakles_log_collector::filter::FILTER_ALL;
use herakles_log_collector::{LogFilter, LogRecord};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::state::SharedState;

/// Records returned when the request names no limit.
pub const DEFAULT_LOGS_LIMIT: usize = 100;

/// Query parameters of `GET /logs`. Missing filters match everything.
#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    pub level: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl LogsQuery {
    pub fn filter(&self) -> LogFilter {
        LogFilter::new(
            self.level.as_deref().unwrap_or(FILTER_ALL),
            self.status.as_deref().unwrap_or(FILTER_ALL),
            self.search.as_deref().unwrap_or_default(),
        )
    }
}

/// Handler for `GET /logs`.
#[instrument(skip(state))]
pub async fn logs_handler(
    State(state): State<SharedState>,
    Query(query): Query<LogsQuery>,
) -> Json<Vec<LogRecord>> {
    let filter = query.filter();
    let limit = query.limit.unwrap_or(DEFAULT_LOGS_LIMIT);
    let records = state.collector.store.latest(&filter, limit);
    debug!("Serving {} records for /logs", records.len());
    Json(records)
}

/// Handler for `DELETE /logs`.
#[instrument(skip(state))]
pub async fn clear_logs_handler(State(state): State<SharedState>) -> impl IntoResponse {
    if !state.config.clear_endpoint_enabled() {
        warn!("Rejected DELETE /logs, enable_clear_endpoint is off");
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            "Clearing logs is disabled (set enable_clear_endpoint: true)\n".to_string(),
        );
    }

    let store = &state.collector.store;
    let cleared = store.len();
    store.clear();
    info!("Log store cleared ({} records dropped)", cleared);
    (StatusCode::OK, format!("Cleared {cleared} records\n"))
}
