use std::sync::Arc;
use std::time::Instant;

use resilience::{RetryPolicy, Sleeper, TokioSleeper};
use tracing::{debug, info, warn};

use crate::{Metadata, QueryMatch, StoreError, TopK, VectorIndex, VectorRecord};

/// Upsert and query against a [`VectorIndex`] with bounded retry.
#[derive(Clone)]
pub struct VectorStore {
    backend: Arc<dyn VectorIndex>,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore")
            .field("bucket", &self.backend.bucket())
            .field("index", &self.backend.index())
            .field("retry", &self.retry)
            .finish()
    }
}

impl VectorStore {
    pub fn new(backend: Arc<dyn VectorIndex>) -> Self {
        Self {
            backend,
            retry: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn bucket(&self) -> &str {
        self.backend.bucket()
    }

    pub fn index(&self) -> &str {
        self.backend.index()
    }

    /// Stores one record under `key`. There is no payload on success.
    pub async fn upsert(
        &self,
        key: &str,
        vector: &[f32],
        metadata: Metadata,
    ) -> Result<(), StoreError> {
        let record = VectorRecord {
            key: key.to_string(),
            vector: vector.to_vec(),
            metadata,
        };
        let backend = self.backend.as_ref();
        let start = Instant::now();

        let result = self
            .retry
            .run_with(self.sleeper.as_ref(), "store_upsert", |_| backend.put(&record))
            .await;

        match &result {
            Ok(()) => info!(
                bucket = backend.bucket(),
                index = backend.index(),
                key,
                dimension = vector.len(),
                elapsed_micros = start.elapsed().as_micros() as u64,
                "store_upsert_success"
            ),
            Err(err) => warn!(
                bucket = backend.bucket(),
                index = backend.index(),
                key,
                error = %err,
                "store_upsert_failure"
            ),
        }
        result
    }

    /// Top-K nearest neighbours in the order the store returned them.
    pub async fn query(&self, vector: &[f32], top_k: TopK) -> Result<Vec<QueryMatch>, StoreError> {
        let backend = self.backend.as_ref();
        let start = Instant::now();

        let result = self
            .retry
            .run_with(self.sleeper.as_ref(), "store_query", |_| {
                backend.query(vector, top_k)
            })
            .await;

        match &result {
            Ok(matches) => debug!(
                bucket = backend.bucket(),
                index = backend.index(),
                top_k = top_k.get(),
                returned = matches.len(),
                elapsed_micros = start.elapsed().as_micros() as u64,
                "store_query_success"
            ),
            Err(err) => warn!(
                bucket = backend.bucket(),
                index = backend.index(),
                error = %err,
                "store_query_failure"
            ),
        }
        result
    }
}
