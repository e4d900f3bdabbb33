use axum::{extract::State, response::IntoResponse, Json};

use crate::AppState;

/// Liveness check.
///
/// GET /health
#[utoipa::path(get, path = "/health", tag = "System",
    responses((status = 200, description = "Server is up")))]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "log_entries": state.logs.len(),
    }))
}
