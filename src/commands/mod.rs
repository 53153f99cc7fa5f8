//! CLI command implementations for herakles-log-collector.
//!
//! - `config`: Configuration file generation

pub mod config;

pub use config::command_config;
