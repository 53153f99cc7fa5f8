//! Threshold configuration for capacity health.
//!
//! Both bounded components of the collector (the log store and the client
//! roster) report a fill percentage. Thresholds decide when that fill level
//! counts as a warning or as critical.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Warn/critical fill thresholds for one bounded component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityHealthConfig {
    /// Warn when fill_percent > warn_percent (0-100).
    pub warn_percent: Option<f64>,
    /// Critical when fill_percent > critical_percent (0-100).
    pub critical_percent: Option<f64>,
}

impl CapacityHealthConfig {
    pub fn new(warn_percent: Option<f64>, critical_percent: Option<f64>) -> Self {
        Self {
            warn_percent,
            critical_percent,
        }
    }

    /// Checks that thresholds lie in 0..=100 and warn does not exceed critical.
    pub fn validate(&self, component: &'static str) -> Result<(), ConfigError> {
        for value in [self.warn_percent, self.critical_percent].into_iter().flatten() {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { component, value });
            }
        }
        if let (Some(warn), Some(critical)) = (self.warn_percent, self.critical_percent) {
            if warn > critical {
                return Err(ConfigError::ThresholdOrder {
                    component,
                    warn,
                    critical,
                });
            }
        }
        Ok(())
    }
}

/// Health thresholds for every bounded component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// A full log store is normal operation (oldest records rotate out), so
    /// it only ever warns by default.
    pub log_store: CapacityHealthConfig,
    /// Connections beyond the roster capacity are served but not listed.
    pub client_roster: CapacityHealthConfig,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            log_store: CapacityHealthConfig::new(Some(95.0), None),
            client_roster: CapacityHealthConfig::new(Some(80.0), Some(95.0)),
        }
    }
}

impl HealthConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.log_store.validate("log_store")?;
        self.client_roster.validate("client_roster")
    }
}
