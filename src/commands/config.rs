//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Writes the default configuration to `output` (`-` for stdout).
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output.unwrap_or_else(|| PathBuf::from("herakles-log-collector.yaml"));
    let content = generate_config(&format, commented)?;

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Renders the default configuration, with a comment header for YAML if asked.
fn generate_config(
    format: &ConfigFormat,
    commented: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let content = render_config(&Config::default(), format)?;
    Ok(match format {
        ConfigFormat::Yaml if commented => format!("{CONFIG_COMMENTS}\n{content}"),
        _ => content,
    })
}

const CONFIG_COMMENTS: &str = r#"# Herakles Log Collector Configuration
# =====================================
#
# Collector Listener
# ------------------
# bind: "0.0.0.0"              # Bind IP for agent connections
# port: 8080                   # TCP port agents connect to
#
# HTTP API
# --------
# http_bind: "0.0.0.0"         # Bind IP for the HTTP API
# http_port: 9216              # HTTP port (/logs, /clients, /health, /metrics)
# enable_http: true            # Serve the HTTP API
# enable_clear_endpoint: false # Allow DELETE /logs to wipe the store
#
# Capacities
# ----------
# max_clients: 50              # Connections listed in the client roster
# max_logs: 10000              # Records kept in memory (oldest dropped first)
#
# Framing Buffers
# ---------------
# read_chunk_bytes: 16384      # Size of one socket read
# accumulator_bytes: 65536     # Per-connection buffer; reset when exceeded
#
# refresh_interval_ms: 1000    # How often new records are reported
#
# Logging
# -------
# log_level: "info"            # off, error, warn, info, debug, trace
#
# Capacity Health
# ---------------
# health:
#   log_store:     { warn_percent: 95.0, critical_percent: null }
#   client_roster: { warn_percent: 80.0, critical_percent: 95.0 }
"#;
