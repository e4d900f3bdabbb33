//! Server configuration read from the environment.
//!
//! Environment variables:
//! - `HOST`: bind address (default: 0.0.0.0)
//! - `PORT`: bind port (default: 5000)
//! - `JWT_SECRET`: HS256 token secret (required)
//! - `ALLOWED_ORIGINS`: comma-separated CORS whitelist
//!   (default: http://localhost:3000,http://localhost:5173)
//! - `LOG_FORMAT`: "json" or "text" (default: "text")
//! - `LOG_FILE`: path of a daily-rolling log file (optional)
//! - `LOG_ANSI`: "true"/"false" override of ANSI colors

use axum::http::HeaderValue;
use college_core::{Error, Result};

const DEFAULT_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub allowed_origins: Vec<HeaderValue>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("PORT")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(5000);

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| Error::Config("JWT_SECRET must be set".to_string()))?;

        let allowed_origins = parse_allowed_origins(lookup("ALLOWED_ORIGINS").as_deref());

        Ok(Self {
            host,
            port,
            jwt_secret,
            allowed_origins,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging output settings, read before anything else so startup is logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub json: bool,
    pub file: Option<String>,
    pub ansi: Option<bool>,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            json: lookup("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
            file: lookup("LOG_FILE").filter(|v| !v.trim().is_empty()),
            ansi: lookup("LOG_ANSI").map(|v| v == "true" || v == "1"),
        }
    }
}

/// Parse a comma-separated origin whitelist, skipping invalid entries.
pub fn parse_allowed_origins(raw: Option<&str>) -> Vec<HeaderValue> {
    let raw = match raw {
        Some(s) if !s.trim().is_empty() => s,
        _ => DEFAULT_ORIGINS,
    };

    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}
