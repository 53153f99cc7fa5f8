//! Configuration management for herakles-log-collector.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat, LogLevel};
use clap::ValueEnum;
use herakles_log_collector::framer::{DEFAULT_ACCUMULATOR_BYTES, DEFAULT_READ_CHUNK_BYTES};
use herakles_log_collector::log_store::DEFAULT_MAX_LOGS;
use herakles_log_collector::roster::DEFAULT_MAX_CLIENTS;
use herakles_log_collector::server::{DEFAULT_COLLECTOR_PORT, DEFAULT_REFRESH_INTERVAL};
use herakles_log_collector::{ConfigError, HealthConfig, ServerOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;
use tracing::info;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_HTTP_PORT: u16 = 9216;

// Upper bounds for the capacity settings
pub const MAX_LOGS_LIMIT: usize = 10_000_000;
pub const MAX_CLIENTS_LIMIT: usize = 65_536;
pub const MAX_READ_CHUNK_BYTES: usize = 16 * 1024 * 1024;
pub const MAX_ACCUMULATOR_BYTES: usize = 256 * 1024 * 1024;

const DEFAULT_CONFIG_LOCATIONS: [&str; 6] = [
    "/etc/herakles/log-collector.yaml",
    "/etc/herakles/log-collector.yml",
    "/etc/herakles/log-collector.json",
    "./herakles-log-collector.yaml",
    "./herakles-log-collector.yml",
    "./herakles-log-collector.json",
];

/// Collector configuration. Unset fields fall back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Collector listener
    pub bind: Option<String>,
    pub port: Option<u16>,

    // HTTP API
    pub http_bind: Option<String>,
    pub http_port: Option<u16>,
    pub enable_http: Option<bool>,
    /// Allow `DELETE /logs` to wipe the store
    #[serde(alias = "enable-clear-endpoint")]
    pub enable_clear_endpoint: Option<bool>,

    // Capacities
    #[serde(alias = "max-clients")]
    pub max_clients: Option<usize>,
    #[serde(alias = "max-logs")]
    pub max_logs: Option<usize>,

    // Framing buffers
    #[serde(alias = "read-chunk-bytes")]
    pub read_chunk_bytes: Option<usize>,
    #[serde(alias = "accumulator-bytes")]
    pub accumulator_bytes: Option<usize>,

    /// How often the watcher checks for new records
    #[serde(alias = "refresh-interval-ms")]
    pub refresh_interval_ms: Option<u64>,

    // Logging
    pub log_level: Option<String>,

    // Capacity health thresholds
    #[serde(default)]
    pub health: HealthConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            port: Some(DEFAULT_COLLECTOR_PORT),
            http_bind: Some(DEFAULT_BIND_ADDR.to_string()),
            http_port: Some(DEFAULT_HTTP_PORT),
            enable_http: Some(true),
            enable_clear_endpoint: Some(false),
            max_clients: Some(DEFAULT_MAX_CLIENTS),
            max_logs: Some(DEFAULT_MAX_LOGS),
            read_chunk_bytes: Some(DEFAULT_READ_CHUNK_BYTES),
            accumulator_bytes: Some(DEFAULT_ACCUMULATOR_BYTES),
            refresh_interval_ms: Some(DEFAULT_REFRESH_INTERVAL.as_millis() as u64),
            log_level: Some("info".into()),
            health: HealthConfig::default(),
        }
    }
}

impl Config {
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_COLLECTOR_PORT)
    }

    pub fn http_port(&self) -> u16 {
        self.http_port.unwrap_or(DEFAULT_HTTP_PORT)
    }

    pub fn http_enabled(&self) -> bool {
        self.enable_http.unwrap_or(true)
    }

    pub fn clear_endpoint_enabled(&self) -> bool {
        self.enable_clear_endpoint.unwrap_or(false)
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL)
    }

    pub fn collector_addr(&self) -> Result<SocketAddr, ConfigError> {
        socket_addr(self.bind.as_deref(), self.port())
    }

    pub fn http_addr(&self) -> Result<SocketAddr, ConfigError> {
        socket_addr(self.http_bind.as_deref(), self.http_port())
    }

    pub fn server_options(&self) -> ServerOptions {
        ServerOptions {
            max_logs: self.max_logs.unwrap_or(DEFAULT_MAX_LOGS),
            max_clients: self.max_clients.unwrap_or(DEFAULT_MAX_CLIENTS),
            read_chunk_bytes: self.read_chunk_bytes.unwrap_or(DEFAULT_READ_CHUNK_BYTES),
            accumulator_bytes: self.accumulator_bytes.unwrap_or(DEFAULT_ACCUMULATOR_BYTES),
        }
    }
}

fn socket_addr(bind: Option<&str>, port: u16) -> Result<SocketAddr, ConfigError> {
    let bind = bind.unwrap_or(DEFAULT_BIND_ADDR);
    let ip: IpAddr = bind
        .parse()
        .map_err(|_| ConfigError::InvalidBind(bind.to_string()))?;
    Ok(SocketAddr::new(ip, port))
}

fn require_at_least(field: &'static str, value: u64, min: u64) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::TooSmall { field, min, value });
    }
    Ok(())
}

fn require_in_range(field: &'static str, value: usize, max: usize) -> Result<(), ConfigError> {
    require_at_least(field, value as u64, 1)?;
    if value > max {
        return Err(ConfigError::TooLarge {
            field,
            max: max as u64,
            value: value as u64,
        });
    }
    Ok(())
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), ConfigError> {
    let options = cfg.server_options();
    require_in_range("max_logs", options.max_logs, MAX_LOGS_LIMIT)?;
    require_in_range("max_clients", options.max_clients, MAX_CLIENTS_LIMIT)?;
    require_in_range("read_chunk_bytes", options.read_chunk_bytes, MAX_READ_CHUNK_BYTES)?;
    require_in_range("accumulator_bytes", options.accumulator_bytes, MAX_ACCUMULATOR_BYTES)?;
    require_at_least(
        "refresh_interval_ms",
        cfg.refresh_interval().as_millis() as u64,
        1,
    )?;

    if options.accumulator_bytes < options.read_chunk_bytes {
        return Err(ConfigError::AccumulatorSmallerThanChunk {
            accumulator: options.accumulator_bytes,
            chunk: options.read_chunk_bytes,
        });
    }

    let collector = cfg.collector_addr()?;
    let http = cfg.http_addr()?;
    if cfg.http_enabled() && collector.port() == http.port() {
        let overlapping = collector.ip() == http.ip()
            || collector.ip().is_unspecified()
            || http.ip().is_unspecified();
        if overlapping {
            return Err(ConfigError::PortClash {
                bind: collector.ip().to_string(),
                port: collector.port(),
            });
        }
    }

    if let Some(level) = cfg.log_level.as_deref() {
        parse_log_level(level)?;
    }

    cfg.health.validate()
}

/// Parses a configured log level name, ignoring case.
pub fn parse_log_level(level: &str) -> Result<LogLevel, ConfigError> {
    LogLevel::from_str(level, true).map_err(|_| ConfigError::InvalidLogLevel(level.to_string()))
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }
    if let Some(port) = args.port {
        config.port = Some(port);
    }
    if let Some(http_port) = args.http_port {
        config.http_port = Some(http_port);
    }
    if args.disable_http {
        config.enable_http = Some(false);
    }
    if let Some(max_logs) = args.max_logs {
        config.max_logs = Some(max_logs);
    }
    if let Some(max_clients) = args.max_clients {
        config.max_clients = Some(max_clients);
    }
    if let Some(level) = args.log_level.as_ref().and_then(|l| l.to_possible_value()) {
        config.log_level = Some(level.get_name().to_string());
    }

    Ok(config)
}

/// Loads a config file, or the first default location that exists.
///
/// The format follows the file extension (`.json`, `.toml`, anything else
/// is YAML). Missing files yield the default configuration; fields the
/// file leaves out stay unset and fall back to defaults on use.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match DEFAULT_CONFIG_LOCATIONS
            .iter()
            .map(Path::new)
            .find(|p| p.exists())
        {
            Some(found) => found.to_path_buf(),
            None => return Ok(Config::default()),
        },
    };

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)?;

    let config: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        Some("toml") => toml::from_str(&content)?,
        _ => serde_yaml::from_str(&content)?,
    };
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

/// Renders a configuration in the requested format.
pub fn render_config(
    config: &Config,
    format: &ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    })
}

/// Shows configuration in requested format
pub fn show_config(
    config: &Config,
    format: ConfigFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, &format)?);
    Ok(())
}
