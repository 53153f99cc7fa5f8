//! Per-connection reassembly of JSON objects from a raw byte stream.
//!
//! TCP reads arrive with arbitrary boundaries. The framer accumulates them
//! and cuts out one object at a time by brace balance, ignoring braces that
//! sit inside string literals. There is no length prefix: any byte before
//! the first `{` is simply skipped over while scanning.

use std::borrow::Cow;

use tracing::{debug, trace, warn};

use crate::ingest_stats::IngestStats;
use crate::json_fields::object_end;
use crate::log_store::LogStore;
use crate::record::{is_control_message, parse_record};
use crate::snapshot::{ingest_snapshot, is_snapshot};

/// Default size of one socket read.
pub const DEFAULT_READ_CHUNK_BYTES: usize = 16 * 1024;
/// Default accumulator capacity, four read chunks.
pub const DEFAULT_ACCUMULATOR_BYTES: usize = 4 * DEFAULT_READ_CHUNK_BYTES;

/// Outcome of routing one framed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A single record was stored.
    Record,
    /// A snapshot was parsed; holds the number of records stored.
    Snapshot(usize),
    /// HELLO/GOODBYE/PING/PONG, discarded.
    Control,
    /// Nothing could be made of the message.
    Dropped,
}

/// Byte accumulator owned by a single connection.
#[derive(Debug)]
pub struct StreamFramer {
    buffer: Vec<u8>,
    capacity: usize,
}

impl Default for StreamFramer {
    fn default() -> Self {
        Self::new(DEFAULT_ACCUMULATOR_BYTES)
    }
}

impl StreamFramer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::new(),
            capacity,
        }
    }

    /// Appends a chunk read from the socket.
    ///
    /// If the accumulator would overflow, everything buffered so far is
    /// discarded and only `chunk` is kept. Returns true when that happened.
    pub fn push(&mut self, chunk: &[u8]) -> bool {
        if self.buffer.len() + chunk.len() > self.capacity {
            self.buffer.clear();
            self.buffer.extend_from_slice(chunk);
            return true;
        }
        self.buffer.extend_from_slice(chunk);
        false
    }

    /// Cuts the next complete object out of the accumulator.
    ///
    /// The object and every byte before it are drained. Returns `None`, and
    /// leaves the buffer untouched, while no complete object is buffered.
    pub fn next_message(&mut self) -> Option<String> {
        let start = self.buffer.iter().position(|&b| b == b'{')?;
        let end = object_end(&self.buffer, start)?;

        let message = match String::from_utf8_lossy(&self.buffer[start..end]) {
            Cow::Borrowed(text) => text.to_owned(),
            Cow::Owned(text) => {
                trace!(bytes = end - start, "Invalid UTF-8 in framed object replaced");
                text
            }
        };
        self.buffer.drain(..end);
        Some(message)
    }

    /// Number of bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Feeds one chunk and dispatches every message it completes.
    ///
    /// Returns the number of records appended to `store`.
    pub fn ingest(
        &mut self,
        chunk: &[u8],
        client_address: &str,
        store: &LogStore,
        stats: &IngestStats,
    ) -> usize {
        stats.record_bytes(chunk.len());
        if self.push(chunk) {
            stats.record_buffer_reset();
            warn!(
                client = client_address,
                capacity = self.capacity,
                "Receive buffer overflow, discarding buffered data"
            );
        }

        let mut stored = 0;
        while let Some(message) = self.next_message() {
            stats.record_frame();
            match dispatch_message(&message, client_address, store) {
                Dispatch::Record => stored += 1,
                Dispatch::Snapshot(count) => {
                    stats.record_snapshot();
                    debug!(client = client_address, records = count, "Snapshot ingested");
                    stored += count;
                }
                Dispatch::Control => {
                    stats.record_control();
                    trace!(client = client_address, "Control message discarded");
                }
                Dispatch::Dropped => {
                    stats.record_dropped();
                    debug!(client = client_address, "Unparsable message dropped");
                }
            }
        }
        stats.record_stored(stored);
        stored
    }
}

/// Routes one framed object to the snapshot or record parser and stores
/// the result.
pub fn dispatch_message(message: &str, client_address: &str, store: &LogStore) -> Dispatch {
    if is_snapshot(message) {
        return match ingest_snapshot(message, client_address, store) {
            Some(count) => Dispatch::Snapshot(count),
            None => Dispatch::Dropped,
        };
    }

    if is_control_message(message) {
        return Dispatch::Control;
    }

    match parse_record(message, client_address) {
        Some(record) => {
            store.append(record);
            Dispatch::Record
        }
        None => Dispatch::Dropped,
    }
}
