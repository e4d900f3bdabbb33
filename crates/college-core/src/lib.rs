//! # college-core
//!
//! Core types for the college management system API.
//!
//! This crate provides the bounded log capture store behind the admin log
//! panel, the tracing layer that feeds it, bearer token verification with
//! role claims, and the shared error type.

pub mod auth;
pub mod capture;
pub mod error;
pub mod log_store;
pub mod logging;

// Re-export commonly used types at crate root
pub use auth::{AuthUser, Claims, Role, TokenVerifier};
pub use capture::LogCaptureLayer;
pub use error::{Error, Result};
pub use log_store::{
    format_args_message, LogEntry, LogLevel, LogQuery, LogStore, DEFAULT_QUERY_LIMIT,
    MAX_CAPACITY,
};
