#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use embed::{EmbedError, Embedder, Embedding, EmbeddingClient, StubEndpoint};
use resilience::{RecordingSleeper, RetryPolicy};
use semdex::{Pipeline, VectorStore};
use store::{MemoryIndex, QueryMatch, StoreError, TopK, VectorIndex, VectorRecord};

pub const DIM: usize = 384;
pub const BUCKET: &str = "despicable-vectors";
pub const INDEX: &str = "characters";

/// Stub embedding endpoint (nested like the hosted model) over a memory index.
pub struct Harness {
    pub pipeline: Pipeline,
    pub index: Arc<MemoryIndex>,
    pub sleeper: RecordingSleeper,
}

pub fn stub_harness() -> Harness {
    let sleeper = RecordingSleeper::default();
    let client = EmbeddingClient::new(Arc::new(StubEndpoint::new(DIM).with_nesting(2)))
        .with_retry(RetryPolicy::default())
        .with_sleeper(Arc::new(sleeper.clone()));
    let index = Arc::new(MemoryIndex::new(BUCKET, INDEX, DIM));
    let store = VectorStore::new(index.clone())
        .with_retry(RetryPolicy::default())
        .with_sleeper(Arc::new(sleeper.clone()));
    Harness {
        pipeline: Pipeline::new(Arc::new(client), store),
        index,
        sleeper,
    }
}

/// Wraps another embedder and fails for texts containing a marker.
pub struct FlakyEmbedder {
    inner: Arc<dyn Embedder>,
    marker: &'static str,
}

impl FlakyEmbedder {
    pub fn new(inner: Arc<dyn Embedder>, marker: &'static str) -> Self {
        Self { inner, marker }
    }
}

#[async_trait]
impl Embedder for FlakyEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedError> {
        if text.contains(self.marker) {
            return Err(EmbedError::Rejected {
                endpoint: "flaky".into(),
                message: "HTTP error 400: refused".into(),
            });
        }
        self.inner.embed(text).await
    }
}

/// Index that fails the first `failures` calls, then delegates.
pub struct ScriptedIndex {
    inner: MemoryIndex,
    failures: u32,
    fault: fn() -> StoreError,
    pub calls: AtomicU32,
}

impl ScriptedIndex {
    pub fn new(failures: u32, fault: fn() -> StoreError) -> Self {
        Self {
            inner: MemoryIndex::new(BUCKET, INDEX, DIM),
            failures,
            fault,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn attempt(&self) -> Result<(), StoreError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err((self.fault)())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl VectorIndex for ScriptedIndex {
    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    fn index(&self) -> &str {
        self.inner.index()
    }

    async fn put(&self, record: &VectorRecord) -> Result<(), StoreError> {
        self.attempt()?;
        self.inner.put(record).await
    }

    async fn query(&self, vector: &[f32], top_k: TopK) -> Result<Vec<QueryMatch>, StoreError> {
        self.attempt()?;
        self.inner.query(vector, top_k).await
    }
}

pub fn stub_embedder() -> Arc<dyn Embedder> {
    Arc::new(
        EmbeddingClient::new(Arc::new(StubEndpoint::new(DIM)))
            .with_sleeper(Arc::new(RecordingSleeper::default())),
    )
}
