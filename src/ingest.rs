//! Ingestion: embed a document, attach metadata, upsert.

use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::document::{record_metadata, Document, RawDocument};
use crate::{Pipeline, PipelineError};

/// Knobs for how documents are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestOptions {
    /// Copy the document text into the stored metadata under `text`.
    pub include_text: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self { include_text: true }
    }
}

/// Confirmation of a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReceipt {
    pub document_id: String,
}

/// One document that could not be ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    /// 1-based position in the input.
    pub position: usize,
    pub reason: String,
}

/// Outcome of a batch; `succeeded + failed` equals the input length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub document_ids: Vec<String>,
    pub failures: Vec<BatchFailure>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

impl Pipeline {
    /// Validates and ingests one document.
    pub async fn ingest(&self, raw: RawDocument) -> Result<IngestReceipt, PipelineError> {
        let doc = raw.into_document()?;
        self.ingest_document(&doc).await
    }

    /// Embeds `doc`, generates a fresh key and upserts the record.
    pub async fn ingest_document(&self, doc: &Document) -> Result<IngestReceipt, PipelineError> {
        let start = Instant::now();
        let embedding = self.embedder.embed(&doc.text).await?;

        let document_id = Uuid::new_v4().to_string();
        let metadata = record_metadata(doc, self.options.include_text, Utc::now());
        self.store
            .upsert(&document_id, embedding.as_slice(), metadata)
            .await?;

        info!(
            document_id = %document_id,
            text_len = doc.text.len(),
            dimension = embedding.dimension(),
            elapsed_micros = start.elapsed().as_micros() as u64,
            "ingest_success"
        );
        Ok(IngestReceipt { document_id })
    }

    /// Ingests documents one at a time, in order, never stopping on a
    /// failure.
    pub async fn ingest_batch(&self, docs: Vec<RawDocument>) -> BatchSummary {
        self.ingest_batch_with_progress(docs, |_, _, _| {}).await
    }

    /// Like [`Pipeline::ingest_batch`], calling `on_item(position, total,
    /// outcome)` after each document.
    pub async fn ingest_batch_with_progress<F>(
        &self,
        docs: Vec<RawDocument>,
        mut on_item: F,
    ) -> BatchSummary
    where
        F: FnMut(usize, usize, &Result<IngestReceipt, PipelineError>),
    {
        let total = docs.len();
        let mut summary = BatchSummary::default();

        for (idx, raw) in docs.into_iter().enumerate() {
            let position = idx + 1;
            info!(position, total, text_len = raw.text_len(), "ingest_item_start");

            let outcome = self.ingest(raw).await;
            on_item(position, total, &outcome);

            match outcome {
                Ok(receipt) => {
                    summary.succeeded += 1;
                    summary.document_ids.push(receipt.document_id);
                }
                Err(err) => {
                    warn!(position, total, error = %err, "ingest_item_failure");
                    summary.failed += 1;
                    summary.failures.push(BatchFailure {
                        position,
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "ingest_batch_finished"
        );
        summary
    }
}
