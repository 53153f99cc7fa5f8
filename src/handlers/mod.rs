//! HTTP endpoint handlers for the collector.
//!
//! - `/`: Plain-text index
//! - `/logs`: Filtered records (GET) and store reset (DELETE)
//! - `/clients`: Connected agents
//! - `/health`: Capacity health and ingest statistics
//! - `/metrics`: Prometheus metrics endpoint

pub mod clients;
pub mod health;
pub mod logs;
pub mod metrics;
pub mod root;

// Re-export handlers
pub use clients::clients_handler;
pub use health::health_handler;
pub use logs::{clear_logs_handler, logs_handler};
pub use metrics::metrics_handler;
pub use root::root_handler;
