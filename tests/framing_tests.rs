//! Integration tests for stream framing and dispatch.
//!
//! These tests feed byte streams through `StreamFramer::ingest` the way a
//! connection handler does and check what lands in the store.

use herakles_log_collector::{IngestStats, LogFilter, LogRecord, LogStore, StreamFramer};

const ADDR: &str = "192.0.2.10:53000";

/// Feeds every chunk in order and returns the stored records.
fn ingest_chunks(chunks: &[&[u8]]) -> (Vec<LogRecord>, IngestStats) {
    let store = LogStore::new(100);
    let stats = IngestStats::new();
    let mut framer = StreamFramer::default();
    for chunk in chunks {
        framer.ingest(chunk, ADDR, &store, &stats);
    }
    (store.snapshot(|_| true), stats)
}

/// Comparable view of a record, ignoring the ingestion-time timestamp.
fn key(record: &LogRecord) -> (i32, String, String, String, String, String) {
    (
        record.pid,
        record.name.clone(),
        record.status.clone(),
        record.user.clone(),
        record.level.clone(),
        record.client_address.clone(),
    )
}

#[test]
fn test_split_mid_key_matches_unsplit() {
    let full: &[u8] = br#"{"pid":77,"name":"redis","status":"sleeping","user":"redis"}"#;
    let (whole, _) = ingest_chunks(&[full]);

    for split in 1..full.len() {
        let (parts, _) = ingest_chunks(&[&full[..split], &full[split..]]);
        assert_eq!(parts.len(), 1, "split at {split}");
        assert_eq!(key(&parts[0]), key(&whole[0]), "split at {split}");
    }
}

#[test]
fn test_byte_at_a_time_stream() {
    let stream = br#"{"pid":1,"message":"a } b"}{"pid":2}"#;
    let chunks: Vec<&[u8]> = stream.chunks(1).collect();
    let (records, stats) = ingest_chunks(&chunks);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].message, "a } b");
    assert_eq!(stats.snapshot().messages_framed, 2);
}

#[test]
fn test_escaped_quote_frames_as_one_object() {
    let (records, _) = ingest_chunks(&[br#"{"name":"a\"b","pid":1}"#.as_slice()]);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "a\\\"b");
    assert_eq!(records[0].pid, 1);
}

#[test]
fn test_control_messages_never_stored() {
    let first: &[u8] = br#"{"type":"ping"}{"type":"HELLO","client_name":"agent"}"#;
    let second: &[u8] = br#"{"type":"weather","name":"probe"}{"type":"goodbye"}"#;
    let (records, stats) = ingest_chunks(&[first, second]);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "probe");
    assert_eq!(stats.snapshot().control_messages, 3);
}

#[test]
fn test_snapshot_hostname_backfill() {
    let (records, stats) = ingest_chunks(&[
        br#"{"hostname":"H","processes":[{"pid":1,"name":"a"},{"pid":2,"name":"b","hostname":"X"}]}"#.as_slice(),
    ]);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].hostname, "H");
    assert_eq!(records[1].hostname, "X");
    assert_eq!(stats.snapshot().snapshots_received, 1);
}

#[test]
fn test_length_prefixed_agent_frames_still_parse() {
    // The agent prepends a 4-byte big-endian length; those bytes are skipped
    let body = br#"{"pid":9,"name":"agent"}"#;
    let mut frame = (body.len() as u32).to_be_bytes().to_vec();
    frame.extend_from_slice(body);

    let (records, _) = ingest_chunks(&[frame.as_slice(), frame.as_slice()]);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.name == "agent"));
}

#[test]
fn test_overflow_recovers_object_in_newest_chunk() {
    let store = LogStore::new(10);
    let stats = IngestStats::new();
    let mut framer = StreamFramer::new(64);

    // An object that never closes fills the accumulator
    let stuck = format!(r#"{{"message":"{}"#, "x".repeat(40));
    framer.ingest(stuck.as_bytes(), ADDR, &store, &stats);
    assert_eq!(store.len(), 0);

    let stored = framer.ingest(br#"{"pid":5,"name":"after-reset"}"#, ADDR, &store, &stats);
    assert_eq!(stored, 1);
    assert_eq!(store.snapshot(|_| true)[0].name, "after-reset");
    assert_eq!(stats.snapshot().buffer_resets, 1);
}

#[test]
fn test_filter_after_ingest() {
    let store = LogStore::new(10);
    let stats = IngestStats::new();
    let mut framer = StreamFramer::default();
    framer.ingest(
        br#"{"pid":1,"status":"error"}{"pid":2,"status":"running"}{"pid":3,"status":"ERROR"}"#,
        ADDR,
        &store,
        &stats,
    );

    let errors = store.filtered(&LogFilter::new("ALL", "ERROR", ""));
    assert_eq!(errors.iter().map(|r| r.pid).collect::<Vec<_>>(), vec![1, 3]);
}
