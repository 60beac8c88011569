use resilience::Retryable;
use thiserror::Error;

/// Errors surfaced while producing an embedding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmbedError {
    /// The endpoint failed in a way that may clear up on its own
    /// (throttling, 5xx, network errors, timeouts).
    #[error("inference endpoint '{endpoint}' failed: {message}")]
    Service { endpoint: String, message: String },
    /// The endpoint refused the request outright (bad input, auth, 4xx).
    #[error("inference endpoint '{endpoint}' rejected the request: {message}")]
    Rejected { endpoint: String, message: String },
    /// The response could not be decoded, or held non-numeric entries.
    #[error("unexpected inference response: {0}")]
    Protocol(String),
    /// The decoded response is not a usable vector (not a list, or empty).
    #[error("invalid embedding: {0}")]
    InvalidEmbedding(String),
    /// Endpoint configuration is inconsistent.
    #[error("invalid embedding config: {0}")]
    InvalidConfig(String),
}

impl EmbedError {
    pub(crate) fn service(endpoint: &str, message: impl Into<String>) -> Self {
        Self::Service {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn rejected(endpoint: &str, message: impl Into<String>) -> Self {
        Self::Rejected {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }
}

impl Retryable for EmbedError {
    fn is_retryable(&self) -> bool {
        matches!(self, EmbedError::Service { .. })
    }
}
