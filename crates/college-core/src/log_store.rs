//! Bounded, newest-first capture store for diagnostic output and request logs.
//!
//! The store backs the admin log panel. It keeps at most [`MAX_CAPACITY`]
//! entries, evicting the oldest first, and serves filtered snapshots to the
//! `/logs` endpoint.
//!
//! One store is created at startup and shared by handle: the tracing capture
//! layer and the request-log middleware append to it, the admin handlers
//! query and clear it. Cloning a [`LogStore`] clones the handle, not the
//! entries.
//!
//! All operations hold a single blocking mutex for a short, I/O-free critical
//! section. A blocking lock is used because appends arrive from synchronous
//! tracing callbacks on arbitrary threads.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum number of entries retained.
pub const MAX_CAPACITY: usize = 200;

/// Number of entries returned by a query that names no limit.
pub const DEFAULT_QUERY_LIMIT: usize = 50;

/// Severity of a captured entry.
///
/// Unrecognized levels are kept verbatim in [`LogLevel::Other`] rather than
/// rejected. On the wire every level is a plain lowercase string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
    Other(String),
}

impl LogLevel {
    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Debug => "debug",
            LogLevel::Other(s) => s,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for LogLevel {
    fn from(s: &str) -> Self {
        match s {
            "info" => LogLevel::Info,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            "debug" => LogLevel::Debug,
            other => LogLevel::Other(other.to_string()),
        }
    }
}

impl From<String> for LogLevel {
    fn from(s: String) -> Self {
        match s.as_str() {
            "info" | "warn" | "error" | "debug" => LogLevel::from(s.as_str()),
            _ => LogLevel::Other(s),
        }
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// One captured diagnostic or request-completion record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LogEntry {
    /// Unique entry identifier (UUIDv7).
    pub id: String,
    /// Capture time, millisecond precision, RFC 3339 on the wire.
    #[serde(with = "timestamp_millis")]
    #[schema(value_type = String, example = "2026-10-18T09:15:02.417Z")]
    pub timestamp: DateTime<Utc>,
    #[schema(value_type = String, example = "info")]
    pub level: LogLevel,
    pub message: String,
    /// Structured context, e.g. method/url/status/duration_ms for requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub meta: Option<Map<String, Value>>,
}

mod timestamp_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}

/// Filter applied by [`LogStore::query`]. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogQuery {
    /// Keep only entries with exactly this level.
    pub level: Option<LogLevel>,
    /// Maximum entries returned; defaults to [`DEFAULT_QUERY_LIMIT`] and is
    /// clamped to [`MAX_CAPACITY`].
    pub limit: Option<usize>,
    /// Keep only entries strictly newer than this instant.
    pub since: Option<DateTime<Utc>>,
}

impl LogQuery {
    pub fn with_level(mut self, level: impl Into<LogLevel>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// The limit actually applied: `min(limit or default, MAX_CAPACITY)`.
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_QUERY_LIMIT).min(MAX_CAPACITY)
    }

    fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(level) = &self.level {
            if &entry.level != level {
                return false;
            }
        }
        if let Some(since) = self.since {
            if entry.timestamp <= since {
                return false;
            }
        }
        true
    }
}

/// Render a single message argument: strings verbatim, anything else as
/// JSON text.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render a list of message arguments individually and join them with a
/// single space.
pub fn format_args_message(args: &[Value]) -> String {
    args.iter().map(render_value).collect::<Vec<_>>().join(" ")
}

/// Process-wide bounded log store handle.
#[derive(Debug, Clone, Default)]
pub struct LogStore {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl LogStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_CAPACITY + 1))),
        }
    }

    /// Fixed capacity of every store.
    pub fn capacity(&self) -> usize {
        MAX_CAPACITY
    }

    // A panic while holding the lock cannot leave the deque half-mutated in a
    // way that breaks the capacity invariant, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an entry at the front, evicting from the tail past capacity.
    ///
    /// Never fails. Must not emit tracing events: it runs inside the
    /// capture layer.
    pub fn append(
        &self,
        level: impl Into<LogLevel>,
        message: impl Into<String>,
        meta: Option<Map<String, Value>>,
    ) {
        self.push(|| Utc::now().trunc_subsecs(3), level.into(), message.into(), meta);
    }

    /// Append with an arbitrary JSON message; non-string values are stored
    /// as JSON text.
    pub fn append_value(
        &self,
        level: impl Into<LogLevel>,
        message: &Value,
        meta: Option<Map<String, Value>>,
    ) {
        self.append(level, render_value(message), meta);
    }

    // The clock is read under the lock so concurrent appends get timestamps
    // in the same order as their insertion.
    fn push<F>(&self, clock: F, level: LogLevel, message: String, meta: Option<Map<String, Value>>)
    where
        F: FnOnce() -> DateTime<Utc>,
    {
        let mut entries = self.lock();
        let timestamp = clock();

        // Wall clocks can step backwards; keep insertion order and timestamp
        // order in agreement.
        let timestamp = match entries.front() {
            Some(newest) if newest.timestamp > timestamp => newest.timestamp,
            _ => timestamp,
        };

        entries.push_front(LogEntry {
            id: Uuid::now_v7().to_string(),
            timestamp,
            level,
            message,
            meta,
        });
        entries.truncate(MAX_CAPACITY);
    }

    /// Newest-first snapshot of entries matching `query`.
    pub fn query(&self, query: &LogQuery) -> Vec<LogEntry> {
        let limit = query.effective_limit();
        self.lock()
            .iter()
            .filter(|entry| query.matches(entry))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;
    use std::collections::HashSet;

    fn fill(store: &LogStore, n: usize) {
        for i in 1..=n {
            store.append(LogLevel::Info, i.to_string(), None);
        }
    }

    fn messages(entries: &[LogEntry]) -> Vec<String> {
        entries.iter().map(|e| e.message.clone()).collect()
    }

    fn all(store: &LogStore) -> Vec<LogEntry> {
        store.query(&LogQuery::default().with_limit(MAX_CAPACITY))
    }

    // =========================================================================
    // Capacity and eviction
    // =========================================================================

    #[test]
    fn test_capacity_invariant_keeps_last_entries_newest_first() {
        let store = LogStore::new();
        fill(&store, MAX_CAPACITY + 37);

        assert_eq!(store.len(), MAX_CAPACITY);

        let expected: Vec<String> = (38..=MAX_CAPACITY + 37)
            .rev()
            .map(|i| i.to_string())
            .collect();
        assert_eq!(messages(&all(&store)), expected);
    }

    #[test]
    fn test_append_to_full_store_evicts_exactly_the_oldest() {
        let store = LogStore::new();
        fill(&store, MAX_CAPACITY);
        assert_eq!(store.len(), MAX_CAPACITY);

        let before = all(&store);
        store.append(LogLevel::Warn, "overflow", None);
        let after = all(&store);

        assert_eq!(after.len(), MAX_CAPACITY);
        assert_eq!(after[0].message, "overflow");
        // Everything except the single oldest entry survived, shifted by one.
        assert_eq!(&after[1..], &before[..MAX_CAPACITY - 1]);
        assert!(!after.iter().any(|e| e.message == "1"));
    }

    #[test]
    fn test_205_appends_query_limit_5() {
        let store = LogStore::new();
        fill(&store, 205);

        let result = store.query(&LogQuery::default().with_limit(5));
        assert_eq!(messages(&result), vec!["205", "204", "203", "202", "201"]);

        let oldest = all(&store);
        assert_eq!(oldest.last().unwrap().message, "6");
    }

    // =========================================================================
    // Ordering
    // =========================================================================

    #[test]
    fn test_newest_first_ordering() {
        let store = LogStore::new();
        store.append(LogLevel::Info, "first", None);
        store.append(LogLevel::Info, "second", None);
        store.append(LogLevel::Info, "third", None);

        let result = store.query(&LogQuery::default());
        assert_eq!(messages(&result), vec!["third", "second", "first"]);
        assert!(result[0].timestamp >= result[1].timestamp);
        assert!(result[1].timestamp >= result[2].timestamp);
    }

    #[test]
    fn test_timestamp_never_decreases_when_clock_steps_back() {
        let store = LogStore::new();
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        store.push(|| t, LogLevel::Info, "later".into(), None);
        store.push(|| t - Duration::seconds(30), LogLevel::Info, "skewed".into(), None);

        let result = all(&store);
        assert_eq!(result[0].message, "skewed");
        assert_eq!(result[0].timestamp, t);
    }

    #[test]
    fn test_timestamp_is_read_while_holding_the_lock() {
        let store = LogStore::new();
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        store.push(
            || {
                assert!(store.entries.try_lock().is_err());
                t
            },
            LogLevel::Info,
            "locked".into(),
            None,
        );
        assert_eq!(all(&store)[0].timestamp, t);
    }

    #[test]
    fn test_ids_are_unique() {
        let store = LogStore::new();
        fill(&store, MAX_CAPACITY);
        let ids: HashSet<String> = all(&store).into_iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), MAX_CAPACITY);
    }

    // =========================================================================
    // Filters
    // =========================================================================

    #[test]
    fn test_level_filter_keeps_relative_order() {
        let store = LogStore::new();
        store.append(LogLevel::Info, "i1", None);
        store.append(LogLevel::Error, "e1", None);
        store.append(LogLevel::Warn, "w1", None);
        store.append(LogLevel::Error, "e2", None);
        store.append(LogLevel::Info, "i2", None);

        let result = store.query(&LogQuery::default().with_level(LogLevel::Error));
        assert_eq!(messages(&result), vec!["e2", "e1"]);
        assert!(result.iter().all(|e| e.level == LogLevel::Error));
    }

    #[test]
    fn test_disk_full_scenario() {
        let store = LogStore::new();
        store.append(LogLevel::Error, "disk full", None);
        store.append(LogLevel::Info, "server started", None);

        let result = store.query(&LogQuery::default().with_level("error"));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].message, "disk full");
    }

    #[test]
    fn test_since_filter_is_strictly_greater() {
        let store = LogStore::new();
        let t1 = Utc.with_ymd_and_hms(2026, 1, 10, 8, 0, 0).unwrap();
        let t2 = t1 + Duration::milliseconds(1);
        let t3 = t1 + Duration::seconds(5);
        store.push(|| t1, LogLevel::Info, "t1".into(), None);
        store.push(|| t2, LogLevel::Info, "t2".into(), None);
        store.push(|| t3, LogLevel::Info, "t3".into(), None);

        let result = store.query(&LogQuery::default().with_since(t1));
        assert_eq!(messages(&result), vec!["t3", "t2"]);
    }

    #[test]
    fn test_level_and_since_combined() {
        let store = LogStore::new();
        let t0 = Utc.with_ymd_and_hms(2026, 1, 10, 8, 0, 0).unwrap();
        store.push(|| t0, LogLevel::Error, "old error".into(), None);
        store.push(|| t0 + Duration::seconds(1), LogLevel::Info, "new info".into(), None);
        store.push(|| t0 + Duration::seconds(2), LogLevel::Error, "new error".into(), None);

        let result = store.query(&LogQuery::default().with_level(LogLevel::Error).with_since(t0));
        assert_eq!(messages(&result), vec!["new error"]);
    }

    #[test]
    fn test_default_limit_is_50() {
        let store = LogStore::new();
        fill(&store, 120);
        assert_eq!(store.query(&LogQuery::default()).len(), DEFAULT_QUERY_LIMIT);
    }

    #[test]
    fn test_limit_clamped_to_capacity() {
        let store = LogStore::new();
        fill(&store, MAX_CAPACITY);
        let result = store.query(&LogQuery::default().with_limit(10_000));
        assert_eq!(result.len(), MAX_CAPACITY);
    }

    #[test]
    fn test_query_does_not_mutate() {
        let store = LogStore::new();
        fill(&store, 10);
        let _ = store.query(&LogQuery::default().with_level(LogLevel::Error));
        assert_eq!(store.len(), 10);
    }

    #[test]
    fn test_unknown_level_stored_verbatim_and_filterable() {
        let store = LogStore::new();
        store.append("audit", "grade changed", None);
        store.append(LogLevel::Info, "noise", None);

        let result = store.query(&LogQuery::default().with_level("audit"));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].level, LogLevel::Other("audit".to_string()));
        assert_eq!(result[0].level.as_str(), "audit");
    }

    // =========================================================================
    // Clear
    // =========================================================================

    #[test]
    fn test_clear_then_query_is_empty() {
        let store = LogStore::new();
        fill(&store, 20);
        store.clear();
        assert!(store.is_empty());
        assert!(store.query(&LogQuery::default()).is_empty());
    }

    #[test]
    fn test_clear_on_empty_store_is_noop() {
        let store = LogStore::new();
        store.clear();
        store.clear();
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_clones_share_entries() {
        let store = LogStore::new();
        let handle = store.clone();
        handle.append(LogLevel::Debug, "via clone", None);
        assert_eq!(store.len(), 1);
        store.clear();
        assert!(handle.is_empty());
    }

    // =========================================================================
    // Messages and meta
    // =========================================================================

    #[test]
    fn test_append_value_serializes_non_strings() {
        let store = LogStore::new();
        store.append_value(LogLevel::Info, &json!({"course": "CS101", "seats": 40}), None);
        store.append_value(LogLevel::Info, &json!("plain text"), None);
        store.append_value(LogLevel::Info, &json!(42), None);

        let result = messages(&all(&store));
        assert_eq!(result[0], "42");
        assert_eq!(result[1], "plain text");
        assert_eq!(result[2], r#"{"course":"CS101","seats":40}"#);
    }

    #[test]
    fn test_format_args_message_joins_with_single_space() {
        let args = vec![json!("enrolled"), json!(3), json!({"student": "s-17"}), json!(null)];
        assert_eq!(
            format_args_message(&args),
            r#"enrolled 3 {"student":"s-17"} null"#
        );
        assert_eq!(format_args_message(&[]), "");
    }

    #[test]
    fn test_meta_is_owned_by_entry() {
        let store = LogStore::new();
        let mut meta = Map::new();
        meta.insert("status".into(), json!(200));
        store.append(LogLevel::Info, "GET /logs 200 - 3ms", Some(meta.clone()));

        meta.insert("status".into(), json!(500));

        let mut snapshot = all(&store);
        assert_eq!(snapshot[0].meta.as_ref().unwrap()["status"], json!(200));

        // Mutating a query result does not reach back into the store.
        snapshot[0].message.push_str(" (edited)");
        assert_eq!(all(&store)[0].message, "GET /logs 200 - 3ms");
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = LogEntry {
            id: "0192".into(),
            timestamp: Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap(),
            level: LogLevel::Warn,
            message: "slow query".into(),
            meta: None,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["timestamp"], "2026-02-03T04:05:06.000Z");
        assert_eq!(value["level"], "warn");
        assert!(value.get("meta").is_none());

        let back: LogEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_level_string_conversions() {
        assert_eq!(LogLevel::from("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from("trace".to_string()), LogLevel::Other("trace".into()));
        assert_eq!(String::from(LogLevel::Error), "error");
        assert_eq!(LogLevel::Other("audit".into()).to_string(), "audit");
    }

    // =========================================================================
    // Concurrency
    // =========================================================================

    #[test]
    fn test_concurrent_appends_and_queries_respect_capacity() {
        let store = LogStore::new();

        std::thread::scope(|s| {
            for t in 0..8 {
                let store = store.clone();
                s.spawn(move || {
                    for i in 0..100 {
                        store.append(LogLevel::Info, format!("{t}-{i}"), None);
                    }
                });
            }
            for _ in 0..2 {
                let store = store.clone();
                s.spawn(move || {
                    for _ in 0..100 {
                        let snapshot = store.query(&LogQuery::default().with_limit(MAX_CAPACITY));
                        assert!(snapshot.len() <= MAX_CAPACITY);
                        let ids: HashSet<&str> = snapshot.iter().map(|e| e.id.as_str()).collect();
                        assert_eq!(ids.len(), snapshot.len());
                        assert!(snapshot.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
                    }
                });
            }
        });

        assert_eq!(store.len(), MAX_CAPACITY);
    }
}
