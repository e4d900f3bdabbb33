//! Request completion capture.
//!
//! Appends one log entry per finished HTTP request, with the level taken
//! from the response status. Sits outside the panic-catching layer so
//! panicking handlers are recorded as 500s.

use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use college_core::{logging, LogLevel};
use serde_json::{Map, Value};

use crate::AppState;

/// `error` for 5xx, `warn` for 4xx, `info` for everything else.
pub fn level_for_status(status: StatusCode) -> LogLevel {
    if status.is_server_error() {
        LogLevel::Error
    } else if status.is_client_error() {
        LogLevel::Warn
    } else {
        LogLevel::Info
    }
}

pub async fn request_log(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let url = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = started.elapsed().as_millis() as u64;

    let mut meta = Map::new();
    meta.insert(logging::METHOD.to_string(), Value::from(method.clone()));
    meta.insert(logging::URL.to_string(), Value::from(url.clone()));
    meta.insert(logging::STATUS.to_string(), Value::from(status.as_u16()));
    meta.insert(logging::DURATION_MS.to_string(), Value::from(duration_ms));
    if let Some(id) = request_id {
        meta.insert(logging::REQUEST_ID.to_string(), Value::from(id));
    }

    state.logs.append(
        level_for_status(status),
        format!("{} {} {} - {}ms", method, url, status.as_u16(), duration_ms),
        Some(meta),
    );

    response
}
