//! college-api - HTTP API server for the college management system.
//!
//! The router is built here so the server binary and the integration tests
//! share exactly the same middleware stack.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query_types;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, Uri},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use college_core::{LogStore, TokenVerifier};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use uuid::Uuid;

pub use error::ApiError;

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide capture store, shared with the tracing capture layer.
    pub logs: LogStore,
    /// Bearer token verifier.
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(logs: LogStore, verifier: TokenVerifier) -> Self {
        Self {
            logs,
            verifier: Arc::new(verifier),
        }
    }
}

/// OpenAPI documentation served at `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "College Management System API",
        description = "Admin log capture endpoints of the college management system"
    ),
    paths(
        handlers::logs::list_logs,
        handlers::logs::clear_logs,
        handlers::health::health_check,
    ),
    components(schemas(
        college_core::LogEntry,
        handlers::logs::LogsResponse,
        handlers::logs::ClearLogsResponse,
    )),
    tags(
        (name = "Logs", description = "Captured diagnostic and request logs (admin only)"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

/// Build the application router with its full middleware stack.
///
/// Layer order, outermost first: CORS, request id, trace, request-log
/// capture, panic catcher.
pub fn build_router(state: AppState, allowed_origins: Vec<HeaderValue>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(openapi_json))
        .route(
            "/logs",
            get(handlers::list_logs).delete(handlers::clear_logs),
        )
        .fallback(not_found)
        .layer(CatchPanicLayer::new())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::request_log,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([Method::GET, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .with_state(state)
}
