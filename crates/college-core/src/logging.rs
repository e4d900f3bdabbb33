//! Structured logging schema and field name constants.
//!
//! These constants name the `meta` keys written into captured log entries.
//! Tracing macros take field names as literals, so call sites spell out
//! `user_id` or `subsystem` directly.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Server errors (5xx), degraded service |
//! | WARN  | Client errors (4xx), ignored malformed input |
//! | INFO  | Lifecycle events, request completions |
//! | DEBUG | Decision points, config choices |
//! | TRACE | High-volume detail (captured as `debug`) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID set by the request-id layer (UUIDv7).
pub const REQUEST_ID: &str = "request_id";

/// Tracing target of a captured event.
pub const TARGET: &str = "target";

// ─── HTTP request fields ───────────────────────────────────────────────────

/// HTTP method of a completed request.
pub const METHOD: &str = "method";

/// Request path (with query string) of a completed request.
pub const URL: &str = "url";

/// Response status code of a completed request.
pub const STATUS: &str = "status";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

