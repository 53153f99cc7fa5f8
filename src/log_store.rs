//! Bounded, concurrently accessed store of log records.
//!
//! The store wraps a [`Ringbuffer`] in an `RwLock`: one appender at a time,
//! any number of readers. Records are copied in on append and copied out on
//! read, so no reference ever outlives the lock.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::filter::LogFilter;
use crate::record::LogRecord;
use crate::ringbuffer::Ringbuffer;

/// Default number of records retained.
pub const DEFAULT_MAX_LOGS: usize = 10_000;

/// Summary of the store's state.
#[derive(Debug, Clone, Serialize)]
pub struct LogStoreStats {
    pub capacity: usize,
    pub stored: usize,
    pub total_appended: u64,
    pub total_evicted: u64,
}

/// Fixed-capacity log buffer with FIFO eviction.
pub struct LogStore {
    records: RwLock<Ringbuffer<LogRecord>>,
    appended: AtomicU64,
    evicted: AtomicU64,
}

impl LogStore {
    /// Creates a store holding at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            records: RwLock::new(Ringbuffer::new(capacity)),
            appended: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
        }
    }

    /// Appends a record, silently discarding the oldest one when full.
    pub fn append(&self, record: LogRecord) {
        if let Ok(mut records) = self.records.write() {
            if records.push(record).is_some() {
                self.evicted.fetch_add(1, Ordering::Relaxed);
            }
            self.appended.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Returns copies of the records accepted by `predicate`, oldest first.
    pub fn snapshot<F>(&self, predicate: F) -> Vec<LogRecord>
    where
        F: Fn(&LogRecord) -> bool,
    {
        match self.records.read() {
            Ok(records) => records.iter().filter(|r| predicate(r)).cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Returns copies of the records passing `filter`, oldest first.
    pub fn filtered(&self, filter: &LogFilter) -> Vec<LogRecord> {
        self.snapshot(|record| filter.matches(record))
    }

    /// Returns the newest `limit` records passing `filter`, oldest first.
    pub fn latest(&self, filter: &LogFilter, limit: usize) -> Vec<LogRecord> {
        let mut matching = self.filtered(filter);
        let skip = matching.len().saturating_sub(limit);
        matching.drain(..skip);
        matching
    }

    /// Drops every record. Capacity is unchanged.
    pub fn clear(&self) {
        if let Ok(mut records) = self.records.write() {
            records.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.records.read().map(|r| r.capacity()).unwrap_or(0)
    }

    /// Number of records appended since startup. Never decreases, even when
    /// the store is full or cleared.
    pub fn total_appended(&self) -> u64 {
        self.appended.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> LogStoreStats {
        let (stored, capacity) = self
            .records
            .read()
            .map(|r| (r.len(), r.capacity()))
            .unwrap_or((0, 0));

        LogStoreStats {
            capacity,
            stored,
            total_appended: self.total_appended(),
            total_evicted: self.evicted.load(Ordering::Relaxed),
        }
    }
}
