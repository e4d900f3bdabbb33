//! HTTP handler modules for college-api.

pub mod health;
pub mod logs;

pub use health::health_check;
pub use logs::{clear_logs, list_logs, ClearLogsResponse, LogsResponse};
