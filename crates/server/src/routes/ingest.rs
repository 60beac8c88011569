//! Single-document ingestion.

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use semdex::RawDocument;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Response for a stored document
#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    pub message: String,
    pub document_id: String,
}

/// Ingest one document
///
/// Body: `{"text": "...", "metadata": {...}}`. `metadata` is optional.
pub async fn ingest_document(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<RawDocument>, JsonRejection>,
) -> ServerResult<Json<IngestResponse>> {
    let Json(raw) = payload.map_err(ServerError::from)?;

    tracing::debug!(text_len = raw.text_len(), "ingest_request");

    let receipt = state.pipeline.ingest(raw).await?;

    Ok(Json(IngestResponse {
        message: "Document indexed successfully".to_string(),
        document_id: receipt.document_id,
    }))
}
