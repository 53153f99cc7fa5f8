//! Snapshot messages: many process records under one hostname.
//!
//! ```text
//! {"hostname":"web01","processes":[{"pid":1,"name":"init"}, ...]}
//! ```

use tracing::trace;

use crate::json_fields::{extract_string, object_end};
use crate::log_store::LogStore;
use crate::record::{parse_record, LogRecord, MAX_FIELD_LEN};

/// Literal that marks a framed message as a snapshot.
pub const PROCESSES_KEY: &str = "\"processes\"";

/// Returns true when `json` should be routed to the snapshot parser.
pub fn is_snapshot(json: &str) -> bool {
    json.contains(PROCESSES_KEY)
}

/// Parses every process object in the snapshot's array.
///
/// Records without their own hostname inherit the snapshot's. Returns `None`
/// when the `"processes"` key or the array opening after it is missing.
/// Objects that do not form a record (control messages) are skipped, and an
/// object that never closes ends the scan.
pub fn parse_snapshot(json: &str, client_address: &str) -> Option<Vec<LogRecord>> {
    let hostname = extract_string(json, "hostname", MAX_FIELD_LEN);
    let bytes = json.as_bytes();

    let key_at = json.find(PROCESSES_KEY)?;
    let mut pos = key_at + json[key_at..].find('[')? + 1;

    let mut records = Vec::new();
    while pos < bytes.len() {
        match bytes[pos] {
            b']' => break,
            b'{' => {
                let Some(end) = object_end(bytes, pos) else {
                    trace!(offset = pos, "Unclosed process object ends snapshot scan");
                    break;
                };
                // Both ends sit on ASCII braces, so the slice is on char boundaries
                if let Some(mut record) = parse_record(&json[pos..end], client_address) {
                    if record.hostname.is_empty() {
                        record.hostname = hostname.clone();
                    }
                    records.push(record);
                }
                pos = end;
            }
            _ => pos += 1,
        }
    }
    Some(records)
}

/// Parses a snapshot and appends its records to `store`.
///
/// Returns the number of records stored, or `None` when the snapshot is
/// malformed and nothing was stored.
pub fn ingest_snapshot(json: &str, client_address: &str, store: &LogStore) -> Option<usize> {
    let records = parse_snapshot(json, client_address)?;
    let count = records.len();
    for record in records {
        store.append(record);
    }
    Some(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "192.168.1.20:51000";

    #[test]
    fn test_hostname_backfill() {
        let json = r#"{"hostname":"H","processes":[{"pid":1,"name":"a"},{"pid":2,"name":"b","hostname":"X"}]}"#;
        let records = parse_snapshot(json, ADDR).expect("snapshot");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].pid, 1);
        assert_eq!(records[0].hostname, "H");
        assert_eq!(records[1].name, "b");
        assert_eq!(records[1].hostname, "X");
        assert!(records.iter().all(|r| r.client_address == ADDR));
    }

    #[test]
    fn test_missing_array_fails() {
        assert!(parse_snapshot(r#"{"hostname":"H"}"#, ADDR).is_none());
        assert!(parse_snapshot(r#"{"hostname":"H","processes":null}"#, ADDR).is_none());
    }

    #[test]
    fn test_empty_array() {
        let records = parse_snapshot(r#"{"processes":[]}"#, ADDR).expect("snapshot");
        assert!(records.is_empty());
    }

    #[test]
    fn test_braces_inside_strings_do_not_split_objects() {
        let json = r#"{"hostname":"h","processes":[{"pid":1,"message":"cfg {a} }"},{"pid":2}]}"#;
        let records = parse_snapshot(json, ADDR).expect("snapshot");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "cfg {a} }");
        assert_eq!(records[1].pid, 2);
    }

    #[test]
    fn test_escaped_quote_inside_process() {
        let json = r#"{"processes":[{"pid":1,"name":"say \"}\""},{"pid":2}]}"#;
        let records = parse_snapshot(json, ADDR).expect("snapshot");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, r#"say \"}\""#);
    }

    #[test]
    fn test_stray_bytes_are_skipped() {
        let json = r#"{"processes":[ 7, "x", {"pid":3} , null ,{"pid":4}]}"#;
        let records = parse_snapshot(json, ADDR).expect("snapshot");
        assert_eq!(records.iter().map(|r| r.pid).collect::<Vec<_>>(), vec![3, 4]);
    }

    #[test]
    fn test_unclosed_object_ends_scan() {
        let json = r#"{"processes":[{"pid":1},{"pid":2,"name":"cut"#;
        let records = parse_snapshot(json, ADDR).expect("snapshot");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_control_objects_in_array_are_skipped() {
        let json = r#"{"processes":[{"type":"PING"},{"pid":9}]}"#;
        let records = parse_snapshot(json, ADDR).expect("snapshot");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pid, 9);
    }

    #[test]
    fn test_ingest_snapshot_stores_records() {
        let store = LogStore::new(10);
        let json = r#"{"hostname":"db","processes":[{"pid":1},{"pid":2},{"pid":3}]}"#;
        assert_eq!(ingest_snapshot(json, ADDR, &store), Some(3));
        assert_eq!(store.len(), 3);
        assert_eq!(ingest_snapshot(r#"{"hostname":"db"}"#, ADDR, &store), None);
        assert_eq!(ingest_snapshot(r#"{"processes":[]}"#, ADDR, &store), Some(0));
        assert_eq!(store.len(), 3);
    }
}
