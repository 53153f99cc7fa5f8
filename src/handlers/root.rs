//! Root endpoint handler.
//!
//! Plain-text index with the version, uptime and available endpoints.

use axum::extract::State;
use tracing::{debug, instrument};

use crate::handlers::health::FOOTER_TEXT;
use crate::state::SharedState;

/// Handler for the root `/` endpoint.
#[instrument(skip(state))]
pub async fn root_handler(State(state): State<SharedState>) -> String {
    debug!("Processing / request");

    let version = env!("CARGO_PKG_VERSION");

    let uptime_secs = state.start_time.elapsed().as_secs();
    let hours = uptime_secs / 3600;
    let minutes = (uptime_secs % 3600) / 60;
    let seconds = uptime_secs % 60;

    let clear = if state.config.clear_endpoint_enabled() {
        "enabled"
    } else {
        "disabled"
    };

    format!(
        "Herakles Log Collector {version}\n\
         Uptime: {hours}h {minutes}m {seconds}s\n\
         Collector port: {port}\n\
         \n\
         Endpoints:\n\
         \x20 GET    /logs      Stored records as JSON (?level=&status=&search=&limit=)\n\
         \x20 DELETE /logs      Clear the record store ({clear})\n\
         \x20 GET    /clients   Connected agents\n\
         \x20 GET    /health    Capacity health and ingest statistics\n\
         \x20 GET    /metrics   Prometheus metrics\n\
         \n\
         {FOOTER_TEXT}\n",
        port = state.config.port(),
    )
}
