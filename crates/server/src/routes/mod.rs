//! API route handlers
//!
//! - `health`: liveness and readiness
//! - `ingest`: store one document
//! - `search`: semantic query against the index

pub mod health;
pub mod ingest;
pub mod search;

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// API version and base info
///
/// Root endpoint (GET /), no authentication.
///
/// # Response
///
/// ```json
/// {
///   "name": "semdex server",
///   "version": "0.1.0",
///   "index": "characters",
///   "bucket": "despicable-vectors",
///   "endpoints": ["..."]
/// }
/// ```
pub async fn api_info(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let store = state.pipeline.store();
    Ok(Json(json!({
        "name": "semdex server",
        "version": env!("CARGO_PKG_VERSION"),
        "index": store.index(),
        "bucket": store.bucket(),
        "endpoints": [
            "/ingest",
            "/search",
            "/health",
            "/ready"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
