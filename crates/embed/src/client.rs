use std::sync::Arc;

use async_trait::async_trait;
use resilience::{RetryPolicy, Sleeper, TokioSleeper};
use serde_json::{json, Value};
use tracing::debug;

use crate::{into_embedding, normalize_response, EmbedError, Embedding, InferenceEndpoint};

/// Anything that turns text into an embedding.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedError>;
}

/// Calls an [`InferenceEndpoint`] with retry, then normalizes and validates
/// the response.
#[derive(Clone)]
pub struct EmbeddingClient {
    endpoint: Arc<dyn InferenceEndpoint>,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for EmbeddingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingClient")
            .field("endpoint", &self.endpoint.name())
            .field("retry", &self.retry)
            .finish()
    }
}

impl EmbeddingClient {
    pub fn new(endpoint: Arc<dyn InferenceEndpoint>) -> Self {
        Self {
            endpoint,
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

    pub fn endpoint_name(&self) -> &str {
        self.endpoint.name()
    }

    /// Invokes the endpoint and returns the normalized but unvalidated
    /// response.
    pub async fn embed_value(&self, text: &str) -> Result<Value, EmbedError> {
        let body = serde_json::to_vec(&json!({ "inputs": text }))
            .map_err(|e| EmbedError::Protocol(format!("failed to encode request: {e}")))?;

        let endpoint = self.endpoint.as_ref();
        let raw = self
            .retry
            .run_with(self.sleeper.as_ref(), "embed", |attempt| {
                debug!(endpoint = endpoint.name(), attempt, text_len = text.len(), "embed_request");
                endpoint.invoke(&body)
            })
            .await?;

        let decoded: Value = serde_json::from_slice(&raw)
            .map_err(|e| EmbedError::Protocol(format!("response body is not JSON: {e}")))?;
        Ok(normalize_response(decoded))
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedError> {
        let embedding = into_embedding(self.embed_value(text).await?)?;
        debug!(
            endpoint = self.endpoint.name(),
            dimension = embedding.dimension(),
            "embed_success"
        );
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StubEndpoint;
    use resilience::RecordingSleeper;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Fails with the given error for the first `failures` calls, then
    /// answers with `body`.
    struct Scripted {
        failures: u32,
        error: EmbedError,
        body: &'static [u8],
        calls: AtomicU32,
    }

    impl Scripted {
        fn new(failures: u32, error: EmbedError, body: &'static [u8]) -> Arc<Self> {
            Arc::new(Self {
                failures,
                error,
                body,
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl InferenceEndpoint for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn invoke(&self, _body: &[u8]) -> Result<Vec<u8>, EmbedError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(self.error.clone())
            } else {
                Ok(self.body.to_vec())
            }
        }
    }

    fn client(endpoint: Arc<dyn InferenceEndpoint>, sleeper: &RecordingSleeper) -> EmbeddingClient {
        EmbeddingClient::new(endpoint).with_sleeper(Arc::new(sleeper.clone()))
    }

    #[tokio::test]
    async fn unwraps_nested_stub_response() {
        let sleeper = RecordingSleeper::default();
        let endpoint = Arc::new(StubEndpoint::new(384).with_nesting(2));
        let embedding = client(endpoint, &sleeper).embed("villain").await.unwrap();
        assert_eq!(embedding.dimension(), 384);
    }

    #[tokio::test]
    async fn transient_failures_are_retried_with_backoff() {
        let sleeper = RecordingSleeper::default();
        let endpoint = Scripted::new(2, EmbedError::service("scripted", "throttled"), b"[[0.5, 0.25]]");

        let embedding = client(endpoint.clone(), &sleeper).embed("x").await.unwrap();

        assert_eq!(embedding.as_slice(), &[0.5, 0.25]);
        assert_eq!(endpoint.calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test]
    async fn exhausted_retries_propagate_last_error() {
        let sleeper = RecordingSleeper::default();
        let endpoint = Scripted::new(3, EmbedError::service("scripted", "throttled"), b"[0.5]");

        let err = client(endpoint.clone(), &sleeper).embed("x").await.unwrap_err();

        assert!(matches!(err, EmbedError::Service { .. }));
        assert_eq!(endpoint.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn rejected_requests_are_not_retried() {
        let sleeper = RecordingSleeper::default();
        let endpoint = Scripted::new(5, EmbedError::rejected("scripted", "bad input"), b"[0.5]");

        let err = client(endpoint.clone(), &sleeper).embed("x").await.unwrap_err();

        assert!(matches!(err, EmbedError::Rejected { .. }));
        assert_eq!(endpoint.calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_protocol_error_without_retry() {
        let sleeper = RecordingSleeper::default();
        let endpoint = Scripted::new(0, EmbedError::Protocol(String::new()), b"<html>oops</html>");

        let err = client(endpoint.clone(), &sleeper).embed("x").await.unwrap_err();

        assert!(matches!(err, EmbedError::Protocol(_)));
        assert_eq!(endpoint.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_response_is_invalid_embedding() {
        let sleeper = RecordingSleeper::default();
        let endpoint = Scripted::new(0, EmbedError::Protocol(String::new()), b"[]");

        let err = client(endpoint, &sleeper).embed("x").await.unwrap_err();
        assert!(matches!(err, EmbedError::InvalidEmbedding(_)));
    }

    #[tokio::test]
    async fn embed_value_returns_normalized_shape() {
        let sleeper = RecordingSleeper::default();
        let endpoint = Scripted::new(0, EmbedError::Protocol(String::new()), b"[[[1, 2]]]");

        let value = client(endpoint, &sleeper).embed_value("x").await.unwrap();
        assert_eq!(value, json!([1, 2]));
    }
}
