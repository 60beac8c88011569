use embed::EmbedError;
use store::StoreError;
use thiserror::Error;

/// Errors that can occur while ingesting or searching.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("missing required field: text")]
    MissingText,

    #[error("missing required field: query")]
    MissingQuery,

    #[error("embedding failed: {0}")]
    Embed(#[from] EmbedError),

    #[error("vector store failed: {0}")]
    Store(#[from] StoreError),
}

impl PipelineError {
    /// True when the caller supplied incomplete input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PipelineError::MissingText | PipelineError::MissingQuery)
    }
}
