//! CLI arguments and subcommands for herakles-log-collector.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "herakles-log-collector",
    about = "TCP collector for process telemetry pushed by remote agents",
    long_about = "TCP collector for process telemetry pushed by remote agents.\n\n\
                  Accepts long-lived agent connections, reassembles JSON records and \
                  host snapshots from the raw stream, and keeps the most recent records \
                  in a bounded in-memory store served over a small HTTP API.",
    author = "Michael Moll <exporter@herakles.now> - Herakles",
    version,
    propagate_version = true,
    after_help = "Project: https://github.com/cansp-dev/herakles-log-collector - More info: https://www.herakles.now"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Collector TCP listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind collector to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// HTTP API listen port
    #[arg(long)]
    pub http_port: Option<u16>,

    /// Disable the HTTP API
    #[arg(long)]
    pub disable_http: bool,

    /// Number of records kept in memory
    #[arg(long)]
    pub max_logs: Option<usize>,

    /// Number of connections listed in the client roster
    #[arg(long)]
    pub max_clients: Option<usize>,

    /// Log level (overrides log_level from the config file, default info)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },
}
