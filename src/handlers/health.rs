//! Health check endpoint handler.
//!
//! This module provides the `/health` endpoint handler that returns
//! ingest statistics and the capacity health of the store and roster.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use herakles_log_collector::{evaluate_health, HealthResponse};
use std::fmt::Write as FmtWrite;
use tracing::{debug, instrument};

use crate::state::SharedState;

// Time conversion constants
const SECONDS_PER_HOUR: f64 = 3600.0;
const MINUTES_PER_HOUR: f64 = 60.0;
const HOURS_PER_DAY: f64 = 24.0;

/// Footer text for human-readable HTTP endpoints.
pub const FOOTER_TEXT: &str =
    "Project: https://github.com/cansp-dev/herakles-log-collector - More info: https://www.herakles.now";

/// Handler for the /health endpoint.
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /health request");

    let collector = &state.collector;
    let health = evaluate_health(&collector.store, &collector.roster, &state.health_config);

    let (status, message) = if health.is_critical() {
        (StatusCode::SERVICE_UNAVAILABLE, "Capacity critical")
    } else {
        (StatusCode::OK, "OK")
    };

    let uptime_str = format_uptime(collector.stats.get_uptime_seconds());
    let table = collector.stats.render_table();
    let capacity_section = render_capacity_health(&health);

    debug!("Health check: {} - {}", status, message);
    (
        status,
        [("Content-Type", "text/plain; charset=utf-8")],
        format!(
            "{message}\n\nUptime: {uptime_str}\n\n{table}\n{capacity_section}\n{FOOTER_TEXT}"
        ),
    )
}

fn format_uptime(uptime_seconds: u64) -> String {
    let uptime_hours = uptime_seconds as f64 / SECONDS_PER_HOUR;
    if uptime_hours < 1.0 {
        format!("{:.1} minutes", uptime_hours * MINUTES_PER_HOUR)
    } else if uptime_hours < HOURS_PER_DAY {
        format!("{:.1} hours", uptime_hours)
    } else {
        format!("{:.1} days", uptime_hours / HOURS_PER_DAY)
    }
}

/// Renders capacity health as a plain-text table.
fn render_capacity_health(health: &HealthResponse) -> String {
    let mut out = String::new();
    writeln!(out, "CAPACITY HEALTH").ok();
    writeln!(out, "===============").ok();
    writeln!(out).ok();
    writeln!(
        out,
        "{:15} | {:>10} | {:>10} | {:>7} | {:>8}",
        "Component", "Current", "Capacity", "Fill %", "Status"
    )
    .ok();
    writeln!(out, "{}", "-".repeat(62)).ok();

    for component in &health.components {
        writeln!(
            out,
            "{:15} | {:>10} | {:>10} | {:>7.1} | {:>8}",
            component.name,
            component.current,
            component.capacity,
            component.fill_percent,
            component.status
        )
        .ok();
    }

    writeln!(out).ok();
    writeln!(out, "Overall Status: {}", health.overall_status).ok();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::metrics::CollectorMetrics;
    use crate::state::AppState;
    use herakles_log_collector::{ClientRoster, Collector, HealthConfig, LogStore};
    use std::sync::Arc;

    fn state_with_roster_capacity(max_clients: usize) -> SharedState {
        let config = Config {
            max_clients: Some(max_clients),
            ..Config::default()
        };
        let collector = Collector::new(config.server_options());
        let metrics = CollectorMetrics::new().unwrap();
        Arc::new(AppState::new(collector, metrics, config))
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(90), "1.5 minutes");
        assert_eq!(format_uptime(7200), "2.0 hours");
        assert_eq!(format_uptime(172_800), "2.0 days");
    }

    #[test]
    fn test_render_capacity_health() {
        let store = LogStore::new(10);
        let roster = ClientRoster::new(2);
        roster.add("a:1");
        roster.add("b:1");
        let health = evaluate_health(&store, &roster, &HealthConfig::default());

        let text = render_capacity_health(&health);
        assert!(text.contains("client_roster"));
        assert!(text.contains("critical"));
        assert!(text.contains("Overall Status: critical"));
    }

    #[tokio::test]
    async fn test_health_ok_with_free_capacity() {
        let state = state_with_roster_capacity(2);
        state.collector.roster.add("a:1");

        let response = health_handler(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_unavailable_when_roster_full() {
        let state = state_with_roster_capacity(2);
        state.collector.roster.add("a:1");
        state.collector.roster.add("b:1");

        let response = health_handler(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
