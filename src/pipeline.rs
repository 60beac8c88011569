use std::sync::Arc;

use embed::{Embedder, EmbeddingClient};
use store::VectorStore;
use tracing::info;

use crate::{AppConfig, IngestOptions, PipelineError};

/// Embedding client plus vector store, wired once at startup.
///
/// Ingestion lives in [`crate::ingest`] and search in [`crate::search`];
/// both are methods on this type.
#[derive(Clone)]
pub struct Pipeline {
    pub(crate) embedder: Arc<dyn Embedder>,
    pub(crate) store: VectorStore,
    pub(crate) options: IngestOptions,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("store", &self.store)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(embedder: Arc<dyn Embedder>, store: VectorStore) -> Self {
        Self {
            embedder,
            store,
            options: IngestOptions::default(),
        }
    }

    pub fn with_options(mut self, options: IngestOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the endpoint, backend and retry policy described by `cfg`.
    pub async fn from_config(cfg: &AppConfig) -> Result<Self, PipelineError> {
        let retry = cfg.retry_policy();
        let endpoint = cfg.endpoint_config().build().await?;
        let backend = cfg.backend_config().build().await?;

        info!(
            endpoint = endpoint.name(),
            bucket = backend.bucket(),
            index = backend.index(),
            max_attempts = retry.max_attempts,
            "pipeline_ready"
        );

        let client = EmbeddingClient::new(endpoint).with_retry(retry);
        let store = VectorStore::new(backend).with_retry(retry);
        Ok(Self::new(Arc::new(client), store).with_options(IngestOptions {
            include_text: cfg.include_text,
        }))
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub fn options(&self) -> IngestOptions {
        self.options
    }
}
