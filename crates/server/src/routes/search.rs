//! Semantic search.

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use semdex::{PipelineError, SearchHit, TopK};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Search request
///
/// `k` is accepted in any JSON shape and brought into range: numbers are
/// truncated, numeric strings parsed, anything else falls back to 5.
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub k: Option<Value>,
}

/// Search response
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    pub count: usize,
}

/// Search the index by meaning
pub async fn search_documents(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ServerResult<Json<SearchResponse>> {
    let Json(request) = payload.map_err(ServerError::from)?;

    let query = request
        .query
        .filter(|q| !q.is_empty())
        .ok_or(PipelineError::MissingQuery)?;
    let top_k = TopK::lenient(request.k.as_ref());

    tracing::debug!(query_len = query.len(), top_k = top_k.get(), "search_request");

    let results = state.pipeline.search(&query, top_k).await?;
    let count = results.len();

    Ok(Json(SearchResponse { results, count }))
}
