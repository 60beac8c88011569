use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use once_cell::sync::Lazy;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

static STARTED: Lazy<Instant> = Lazy::new(Instant::now);

fn uptime_seconds() -> u64 {
    STARTED.elapsed().as_secs()
}

/// Liveness: 200 while the process serves requests.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "semdex-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness.
///
/// Configuration is validated before the server binds, so a running server
/// always knows its endpoint and index. Reports them without calling
/// either remote service.
pub async fn readiness_check(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let store = state.pipeline.store();

    Ok(Json(json!({
        "status": "ready",
        "service": "semdex-server",
        "uptime_seconds": uptime_seconds(),
        "components": {
            "embedder": "ready",
            "store": {
                "bucket": store.bucket(),
                "index": store.index(),
            },
            "include_text": state.pipeline.options().include_text,
        }
    })))
}
