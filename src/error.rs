//! Error types for the collector.
//!
//! The parsing pipeline never fails: bad input becomes defaults or is
//! dropped and counted. Only server setup and configuration report errors.

use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Failures of the TCP collector itself.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("failed to bind collector listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("collector I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Rejected configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: u64,
        value: u64,
    },

    #[error("{field} must be at most {max}, got {value}")]
    TooLarge {
        field: &'static str,
        max: u64,
        value: u64,
    },

    #[error("accumulator_bytes ({accumulator}) must be at least read_chunk_bytes ({chunk})")]
    AccumulatorSmallerThanChunk { accumulator: usize, chunk: usize },

    #[error("port {port} on {bind} is configured for both the collector and the HTTP API")]
    PortClash { bind: String, port: u16 },

    #[error("invalid bind address '{0}'")]
    InvalidBind(String),

    #[error("invalid log level '{0}', expected off, error, warn, info, debug or trace")]
    InvalidLogLevel(String),

    #[error("{component}: threshold {value} is outside 0-100")]
    ThresholdOutOfRange { component: &'static str, value: f64 },

    #[error("{component}: warn_percent ({warn}) exceeds critical_percent ({critical})")]
    ThresholdOrder {
        component: &'static str,
        warn: f64,
        critical: f64,
    },
}
