//! Application state shared by the HTTP handlers.

use herakles_log_collector::{Collector, HealthConfig};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::metrics::CollectorMetrics;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// State handed to every HTTP handler.
pub struct AppState {
    /// Store, roster and ingest counters shared with the TCP side.
    pub collector: Collector,
    pub metrics: CollectorMetrics,
    pub config: Arc<Config>,
    pub health_config: HealthConfig,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(collector: Collector, metrics: CollectorMetrics, config: Config) -> Self {
        Self {
            collector,
            metrics,
            health_config: config.health.clone(),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }
}
