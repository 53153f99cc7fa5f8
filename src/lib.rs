//! Herakles Log Collector Library
//!
//! Ingests process telemetry pushed by remote agents over long-lived TCP
//! connections. Each connection's byte stream is cut into JSON objects,
//! each object is turned into a normalized [`LogRecord`], and records land
//! in a bounded, concurrently readable [`LogStore`] with FIFO eviction.
//!
//! # Features
//!
//! - **Stream framing**: quote-aware brace balancing over fragmented reads
//! - **Permissive parsing**: missing or malformed fields fall back to defaults
//! - **Snapshots**: one message carrying many process records for a host
//! - **Capacity health**: warn/critical thresholds for the store and roster
//!
//! # Usage
//!
//! ```rust
//! use herakles_log_collector::{IngestStats, LogFilter, LogStore, StreamFramer};
//!
//! let store = LogStore::new(1000);
//! let stats = IngestStats::new();
//! let mut framer = StreamFramer::default();
//!
//! // A record split across two reads
//! framer.ingest(br#"{"pid":42,"name":"ngi"#, "10.0.0.1:5000", &store, &stats);
//! framer.ingest(br#"nx","status":"crashed"}"#, "10.0.0.1:5000", &store, &stats);
//!
//! let errors = store.filtered(&LogFilter::new("ERROR", "ALL", ""));
//! assert_eq!(errors[0].name, "nginx");
//! ```

pub mod error;
pub mod filter;
pub mod framer;
pub mod health;
pub mod health_config;
pub mod ingest_stats;
pub mod json_fields;
pub mod log_store;
pub mod record;
pub mod ringbuffer;
pub mod roster;
pub mod server;
pub mod snapshot;

// Re-export main types for convenience
pub use error::{CollectorError, ConfigError};
pub use filter::LogFilter;
pub use framer::{dispatch_message, Dispatch, StreamFramer};
pub use health::{evaluate_health, CapacityHealth, HealthResponse, HealthStatus};
pub use health_config::{CapacityHealthConfig, HealthConfig};
pub use ingest_stats::{IngestSnapshot, IngestStats};
pub use log_store::{LogStore, LogStoreStats};
pub use record::{parse_record, LogRecord};
pub use roster::ClientRoster;
pub use server::{bind_listener, watch_for_new_records, welcome_message, Collector, ServerOptions};
pub use snapshot::{ingest_snapshot, parse_snapshot};
