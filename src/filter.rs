//! Record filtering shared by every consumer of the log store.

use serde::{Deserialize, Serialize};

use crate::record::LogRecord;

/// Filter value that disables the level or status check.
pub const FILTER_ALL: &str = "ALL";

/// Level, status and free-text filter over log records.
///
/// All comparisons ignore case. A record passes when the level filter is
/// `ALL` or equal to its level, the status filter is `ALL` or equal to its
/// status, and the search text is empty or found in its name, user,
/// message, status or hostname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogFilter {
    pub level: String,
    pub status: String,
    pub search: String,
}

impl Default for LogFilter {
    fn default() -> Self {
        Self {
            level: FILTER_ALL.to_string(),
            status: FILTER_ALL.to_string(),
            search: String::new(),
        }
    }
}

impl LogFilter {
    pub fn new(
        level: impl Into<String>,
        status: impl Into<String>,
        search: impl Into<String>,
    ) -> Self {
        Self {
            level: level.into(),
            status: status.into(),
            search: search.into(),
        }
    }

    pub fn matches(&self, record: &LogRecord) -> bool {
        field_matches(&self.level, &record.level)
            && field_matches(&self.status, &record.status)
            && (self.search.is_empty()
                || [
                    &record.name,
                    &record.user,
                    &record.message,
                    &record.status,
                    &record.hostname,
                ]
                .iter()
                .any(|field| contains_ignore_case(field, &self.search)))
    }
}

fn field_matches(filter: &str, value: &str) -> bool {
    filter.eq_ignore_ascii_case(FILTER_ALL) || filter.eq_ignore_ascii_case(value)
}

/// Case-insensitive substring test. An empty needle always matches.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}
