//! college-api - HTTP API server for the college management system

use college_api::{
    build_router,
    config::{LoggingConfig, ServerConfig},
    AppState,
};
use college_core::{LogCaptureLayer, LogStore, TokenVerifier};
use tracing::info;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // The capture store exists before logging so startup events are kept.
    let logs = LogStore::new();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "college_api=debug,college_core=debug,tower_http=debug")
    let log_config = LoggingConfig::from_env();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "college_api=debug,college_core=debug,tower_http=debug".into());

    // tower-http spans/events would crowd request entries out of the
    // bounded store; the request-log middleware already records them.
    let capture = LogCaptureLayer::new(logs.clone()).with_filter(filter::filter_fn(|metadata| {
        !metadata.target().starts_with("tower_http")
    }));

    let registry = tracing_subscriber::registry().with(env_filter).with(capture);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_config.file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("college-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_config.json {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_config.ansi.unwrap_or(false)); // no ANSI in files by default
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_config.json {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_config.ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    let log_format = if log_config.json { "json" } else { "text" };
    info!(
        log_format,
        log_file = log_config.file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = ServerConfig::from_env()?;
    let verifier = TokenVerifier::new(&config.jwt_secret)?;
    info!(
        origins = config.allowed_origins.len(),
        capacity = logs.capacity(),
        "Configuration loaded"
    );

    let state = AppState::new(logs, verifier);
    let app = build_router(state, config.allowed_origins.clone());

    // Start server
    let addr = config.bind_addr();
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
