//! Normalized log records and the single-object record parser.
//!
//! A record is built from one JSON object's text using the permissive field
//! extractors in [`crate::json_fields`]. Missing fields fall back to fixed
//! defaults, so every record leaving this module is fully populated.

use chrono::{Local, TimeZone};
use serde::Serialize;

use crate::json_fields::{extract_f64, extract_i64, extract_string};

/// Maximum stored length (bytes) for most string fields.
pub const MAX_FIELD_LEN: usize = 255;
/// Maximum stored length (bytes) for `message`.
pub const MAX_MESSAGE_LEN: usize = 511;
/// Maximum stored length (bytes) for `client_address`.
pub const MAX_ADDRESS_LEN: usize = 63;
const MAX_TYPE_LEN: usize = 63;

pub const DEFAULT_NAME: &str = "unknown";
pub const DEFAULT_STATUS: &str = "static";
pub const DEFAULT_USER: &str = "system";
pub const DEFAULT_MESSAGE: &str = "Functional";

/// CPU usage strictly above this derives `WARN`.
pub const CPU_WARN_PERCENT: f64 = 80.0;
/// Memory strictly above this (1 GiB in KB) derives `WARN`.
pub const MEMORY_WARN_KB: u64 = 1024 * 1024;

/// Display format for every timestamp the collector produces.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const CONTROL_TYPES: [&str; 4] = ["HELLO", "GOODBYE", "PING", "PONG"];

const NAME_KEYS: [&str; 4] = ["name", "app", "process", "client_name"];
const USER_KEYS: [&str; 2] = ["user", "source"];
const LEVEL_KEYS: [&str; 2] = ["level", "log_level"];
const TIMESTAMP_KEYS: [&str; 2] = ["timestamp", "time"];

/// One normalized telemetry event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub pid: i32,
    pub name: String,
    pub status: String,
    pub cpu_percent: f64,
    pub memory_kb: u64,
    pub user: String,
    pub message: String,
    /// `INFO`, `WARN` or `ERROR` when derived; an explicit level is upper-cased as given.
    pub level: String,
    /// Local time, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    /// May be empty. Snapshots back-fill it.
    pub hostname: String,
    /// Peer address of the connection the record arrived on, never payload data.
    pub client_address: String,
}

/// Returns true for protocol messages (`HELLO`, `GOODBYE`, `PING`, `PONG`).
pub fn is_control_message(json: &str) -> bool {
    let kind = extract_string(json, "type", MAX_TYPE_LEN);
    !kind.is_empty()
        && CONTROL_TYPES
            .iter()
            .any(|control| kind.eq_ignore_ascii_case(control))
}

/// Parses one JSON object into a [`LogRecord`].
///
/// Returns `None` when the text does not start with `{` or is a control
/// message. Everything else yields a record, defaults filling the gaps.
pub fn parse_record(json: &str, client_address: &str) -> Option<LogRecord> {
    if !json.trim_start().starts_with('{') {
        return None;
    }
    if is_control_message(json) {
        return None;
    }

    // C-style narrowing, as the agents send plain ints/longs
    let pid = extract_i64(json, "pid") as i32;
    let name = first_non_empty(json, &NAME_KEYS, MAX_FIELD_LEN, DEFAULT_NAME);
    let status = first_non_empty(json, &["status"], MAX_FIELD_LEN, DEFAULT_STATUS);
    let cpu_percent = extract_f64(json, "cpu_percent");
    let memory_kb = extract_i64(json, "memory_kb") as u64;
    let user = first_non_empty(json, &USER_KEYS, MAX_FIELD_LEN, DEFAULT_USER);
    let message = first_non_empty(json, &["message"], MAX_MESSAGE_LEN, DEFAULT_MESSAGE);

    let mut level = first_non_empty(json, &LEVEL_KEYS, MAX_FIELD_LEN, "");
    if level.is_empty() {
        level = derive_level(&status, cpu_percent, memory_kb).to_string();
    }
    level.make_ascii_uppercase();

    let mut timestamp = first_non_empty(json, &TIMESTAMP_KEYS, MAX_FIELD_LEN, "");
    if timestamp.is_empty() {
        timestamp = format_unix_timestamp(extract_i64(json, "timestamp"))
            .unwrap_or_else(current_timestamp);
    }

    let hostname = extract_string(json, "hostname", MAX_FIELD_LEN);
    let client_address =
        crate::json_fields::truncate_at_boundary(client_address, MAX_ADDRESS_LEN).to_string();

    Some(LogRecord {
        pid,
        name,
        status,
        cpu_percent,
        memory_kb,
        user,
        message,
        level,
        timestamp,
        hostname,
        client_address,
    })
}

/// Derives a severity when the payload carries none.
///
/// `CRASHED`/`ZOMBIE` (any case) is an error; CPU above 80% or memory above
/// 1 GiB is a warning; anything else is informational.
pub fn derive_level(status: &str, cpu_percent: f64, memory_kb: u64) -> &'static str {
    if status.eq_ignore_ascii_case("crashed") || status.eq_ignore_ascii_case("zombie") {
        "ERROR"
    } else if cpu_percent > CPU_WARN_PERCENT || memory_kb > MEMORY_WARN_KB {
        "WARN"
    } else {
        "INFO"
    }
}

/// Formats positive Unix seconds as local time.
pub fn format_unix_timestamp(secs: i64) -> Option<String> {
    if secs <= 0 {
        return None;
    }
    Local
        .timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
}

/// Current local wall-clock time in [`TIMESTAMP_FORMAT`].
pub fn current_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

fn first_non_empty(json: &str, keys: &[&str], max_len: usize, default: &str) -> String {
    keys.iter()
        .map(|key| extract_string(json, key, max_len))
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}
