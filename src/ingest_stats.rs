//! Ingestion counters for the collector.
//!
//! Connection handlers bump these without locking; the HTTP layer and the
//! new-data watcher read them for logging and Prometheus export.

use serde::Serialize;
use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Lock-free counters describing ingestion activity.
pub struct IngestStats {
    pub connections_accepted: AtomicU64,
    pub bytes_received: AtomicU64,
    pub messages_framed: AtomicU64,
    pub records_stored: AtomicU64,
    pub snapshots_received: AtomicU64,
    pub control_messages: AtomicU64,
    pub dropped_messages: AtomicU64,
    pub buffer_resets: AtomicU64,
    start_time: Instant,
}

/// Point-in-time copy of [`IngestStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSnapshot {
    pub connections_accepted: u64,
    pub bytes_received: u64,
    pub messages_framed: u64,
    pub records_stored: u64,
    pub snapshots_received: u64,
    pub control_messages: u64,
    pub dropped_messages: u64,
    pub buffer_resets: u64,
    pub uptime_seconds: u64,
}

impl Default for IngestStats {
    fn default() -> Self {
        Self::new()
    }
}

impl IngestStats {
    pub fn new() -> Self {
        Self {
            connections_accepted: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            messages_framed: AtomicU64::new(0),
            records_stored: AtomicU64::new(0),
            snapshots_received: AtomicU64::new(0),
            control_messages: AtomicU64::new(0),
            dropped_messages: AtomicU64::new(0),
            buffer_resets: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_connection(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bytes(&self, count: usize) {
        self.bytes_received.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_frame(&self) {
        self.messages_framed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stored(&self, count: usize) {
        self.records_stored.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_snapshot(&self) {
        self.snapshots_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_control(&self) {
        self.control_messages.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped_messages.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_buffer_reset(&self) {
        self.buffer_resets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn snapshot(&self) -> IngestSnapshot {
        IngestSnapshot {
            connections_accepted: self.connections_accepted.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            messages_framed: self.messages_framed.load(Ordering::Relaxed),
            records_stored: self.records_stored.load(Ordering::Relaxed),
            snapshots_received: self.snapshots_received.load(Ordering::Relaxed),
            control_messages: self.control_messages.load(Ordering::Relaxed),
            dropped_messages: self.dropped_messages.load(Ordering::Relaxed),
            buffer_resets: self.buffer_resets.load(Ordering::Relaxed),
            uptime_seconds: self.get_uptime_seconds(),
        }
    }

    /// Renders the counters as a plain-text table.
    pub fn render_table(&self) -> String {
        let snap = self.snapshot();
        let rows = [
            ("connections accepted", snap.connections_accepted),
            ("bytes received", snap.bytes_received),
            ("messages framed", snap.messages_framed),
            ("records stored", snap.records_stored),
            ("snapshots received", snap.snapshots_received),
            ("control messages", snap.control_messages),
            ("dropped messages", snap.dropped_messages),
            ("buffer resets", snap.buffer_resets),
        ];

        let mut out = String::new();
        writeln!(out, "INGEST STATISTICS").ok();
        writeln!(out, "=================").ok();
        writeln!(out).ok();
        for (label, value) in rows {
            writeln!(out, "{:26} | {:>14}", label, value).ok();
        }
        out
    }
}
