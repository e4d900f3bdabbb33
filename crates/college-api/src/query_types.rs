//! Lenient query parameter parsing for the log endpoints.
//!
//! Bad filter values never fail a request: an unusable `limit` falls back to
//! the default and an unparseable `since` is dropped.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use college_core::LogQuery;
use utoipa::IntoParams;

/// Query parameters of `GET /logs`.
#[derive(Debug, Default, Clone, PartialEq, Eq, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LogsParams {
    /// Exact level to keep (`info`, `warn`, `error`, `debug`).
    pub level: Option<String>,
    /// Maximum entries to return (default 50, at most 200).
    pub limit: Option<String>,
    /// Keep entries strictly newer than this ISO-8601 instant.
    pub since: Option<String>,
}

impl LogsParams {
    /// Pick the known keys out of a raw query map. Duplicate keys resolve to
    /// whichever value the map kept; unknown keys are ignored.
    pub fn from_map(mut raw: HashMap<String, String>) -> Self {
        Self {
            level: raw.remove("level"),
            limit: raw.remove("limit"),
            since: raw.remove("since"),
        }
    }

    pub fn into_query(self) -> LogQuery {
        let level = self
            .level
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());

        let since = self.since.as_deref().and_then(|raw| {
            let parsed = parse_since(raw);
            if parsed.is_none() && !raw.trim().is_empty() {
                tracing::warn!(since = raw, "Ignoring unparseable since filter");
            }
            parsed
        });

        LogQuery {
            level: level.map(Into::into),
            limit: self.limit.as_deref().and_then(parse_limit),
            since,
        }
    }
}

/// Positive integer limit, or `None` for missing/non-numeric/non-positive.
pub fn parse_limit(raw: &str) -> Option<usize> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|n| *n > 0)
        .and_then(|n| usize::try_from(n).ok())
}

/// Parse an instant.
///
/// Accepts:
/// - RFC 3339 with timezone or offset: `2026-01-15T10:30:00.250Z`
/// - ISO 8601 without timezone (assumes UTC): `2026-01-15T10:30:00`
/// - Space-separated date and time (assumes UTC): `2026-01-15 10:30:00`
/// - Date only (assumes midnight UTC): `2026-01-15`
pub fn parse_since(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|n| n.and_utc())
}
