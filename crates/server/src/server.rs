//! Router assembly and the listener loop.

use crate::config::ServerConfig;
use crate::middleware::{api_key_auth, log_requests, request_id};
use crate::routes::{api_info, health, ingest, not_found, search};
use crate::state::ServerState;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use semdex::{AppConfig, Pipeline};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

fn cors_layer(enabled: bool) -> CorsLayer {
    if enabled {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    }
}

/// `/ingest` and `/search`, behind the body limit and key check.
fn document_routes(state: &Arc<ServerState>) -> Router<Arc<ServerState>> {
    Router::new()
        .route("/ingest", post(ingest::ingest_document))
        .route("/search", post(search::search_documents))
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .layer(from_fn_with_state(state.clone(), api_key_auth))
}

/// Builds the full application.
///
/// `/`, `/health` and `/ready` are always public. Outermost first, every
/// request passes tracing, request id, request logging, the timeout,
/// compression and CORS.
pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .merge(document_routes(&state))
        .fallback(not_found)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.timeout(),
        ))
        .layer(CompressionLayer::new())
        .layer(cors_layer(state.config.enable_cors))
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn init_tracing(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .json()
        .init();
}

/// Connects the pipeline, binds and serves until SIGTERM or Ctrl+C.
///
/// The pipeline is built before binding, so a bad endpoint or backend
/// configuration fails startup rather than the first request.
///
/// ```rust,no_run
/// use semdex::AppConfig;
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     server::start_server(ServerConfig::load()?, AppConfig::load()?).await
/// }
/// ```
pub async fn start_server(config: ServerConfig, app_config: AppConfig) -> anyhow::Result<()> {
    init_tracing(&config.log_level);

    let addr = config.socket_addr()?;
    let pipeline = Pipeline::from_config(&app_config).await?;
    let state = Arc::new(ServerState::new(config.clone(), pipeline));
    let app = build_router(state);

    tracing::info!(
        %addr,
        index = %app_config.index_name,
        bucket = %app_config.vector_bucket,
        auth = config.auth_enabled(),
        timeout_secs = config.timeout_secs,
        max_body_mb = config.max_body_size_mb,
        rate_limit_per_minute = config.rate_limit_per_minute,
        cors = config.enable_cors,
        "server_starting"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server_stopped");
    Ok(())
}

/// Resolves on the first shutdown signal. A handler that cannot be
/// installed never resolves, leaving the other one in charge.
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!(signal = "ctrl_c", "shutdown_requested"),
            Err(err) => {
                tracing::error!(error = %err, "ctrl_c_handler_failed");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                tracing::info!(signal = "sigterm", "shutdown_requested");
            }
            Err(err) => {
                tracing::error!(error = %err, "sigterm_handler_failed");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
