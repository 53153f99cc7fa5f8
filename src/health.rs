//! Capacity health of the collector's bounded components.
//!
//! # Usage
//!
//! ```rust
//! use herakles_log_collector::{evaluate_health, ClientRoster, HealthConfig, LogStore};
//!
//! let store = LogStore::new(100);
//! let roster = ClientRoster::new(10);
//!
//! let response = evaluate_health(&store, &roster, &HealthConfig::default());
//! println!("Overall status: {}", response.overall_status);
//! ```

use serde::Serialize;
use std::fmt;

use crate::health_config::{CapacityHealthConfig, HealthConfig};
use crate::log_store::LogStore;
use crate::roster::ClientRoster;

/// Health status, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Warn,
    Critical,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HealthStatus::Ok => "ok",
            HealthStatus::Warn => "warn",
            HealthStatus::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Fill level and status of one bounded component.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CapacityHealth {
    /// Component name (`log_store`, `client_roster`).
    pub name: String,
    pub capacity: usize,
    pub current: usize,
    /// Current fill percentage (0.0 to 100.0).
    pub fill_percent: f64,
    pub status: HealthStatus,
}

/// Health of every component plus the worst status among them.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub components: Vec<CapacityHealth>,
    pub overall_status: HealthStatus,
}

impl HealthResponse {
    pub fn is_critical(&self) -> bool {
        self.overall_status == HealthStatus::Critical
    }
}

/// Evaluates the current fill levels of `store` and `roster`.
pub fn evaluate_health(
    store: &LogStore,
    roster: &ClientRoster,
    config: &HealthConfig,
) -> HealthResponse {
    let components = vec![
        capacity_health("log_store", store.len(), store.capacity(), &config.log_store),
        capacity_health(
            "client_roster",
            roster.len(),
            roster.capacity(),
            &config.client_roster,
        ),
    ];

    let overall_status = components
        .iter()
        .map(|c| c.status)
        .max()
        .unwrap_or(HealthStatus::Ok);

    HealthResponse {
        components,
        overall_status,
    }
}

fn capacity_health(
    name: &str,
    current: usize,
    capacity: usize,
    config: &CapacityHealthConfig,
) -> CapacityHealth {
    let fill_percent = current as f64 / capacity.max(1) as f64 * 100.0;

    CapacityHealth {
        name: name.to_string(),
        capacity,
        current,
        fill_percent,
        status: evaluate_status(fill_percent, config),
    }
}

/// Higher fill is worse: critical above `critical_percent`, warn above
/// `warn_percent`, otherwise ok. Missing thresholds never trigger.
pub fn evaluate_status(fill_percent: f64, config: &CapacityHealthConfig) -> HealthStatus {
    let exceeds = |threshold: Option<f64>| threshold.is_some_and(|t| fill_percent > t);

    if exceeds(config.critical_percent) {
        HealthStatus::Critical
    } else if exceeds(config.warn_percent) {
        HealthStatus::Warn
    } else {
        HealthStatus::Ok
    }
}
