//! Admin log panel HTTP handlers.
//!
//! - `GET /logs`: filtered, newest-first snapshot of the capture store
//! - `DELETE /logs`: empty the capture store

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Json,
};
use college_core::LogEntry;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::RequireAdmin;
use crate::query_types::LogsParams;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogsResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<LogEntry>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClearLogsResponse {
    pub success: bool,
    pub message: String,
}

/// List captured log entries, newest first.
///
/// GET /logs
#[utoipa::path(get, path = "/logs", tag = "Logs",
    params(LogsParams),
    responses(
        (status = 200, description = "Captured entries", body = LogsResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin")))]
pub async fn list_logs(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Query(raw): Query<HashMap<String, String>>,
) -> Json<LogsResponse> {
    let query = LogsParams::from_map(raw).into_query();
    let data = state.logs.query(&query);

    tracing::debug!(
        user_id = %user.user_id,
        result_count = data.len(),
        limit = query.effective_limit(),
        "Log query served"
    );

    Json(LogsResponse {
        success: true,
        count: data.len(),
        data,
    })
}

/// Remove every captured log entry.
///
/// DELETE /logs
#[utoipa::path(delete, path = "/logs", tag = "Logs",
    responses(
        (status = 200, description = "Logs cleared", body = ClearLogsResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin")))]
pub async fn clear_logs(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
) -> Json<ClearLogsResponse> {
    tracing::info!(
        user_id = %user.user_id,
        store_len = state.logs.len(),
        "Clearing captured logs"
    );
    state.logs.clear();

    Json(ClearLogsResponse {
        success: true,
        message: "Logs cleared".to_string(),
    })
}
