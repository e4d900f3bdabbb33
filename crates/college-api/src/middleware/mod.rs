//! HTTP middleware.

pub mod request_log;

pub use request_log::{level_for_status, request_log};
