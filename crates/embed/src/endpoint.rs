use async_trait::async_trait;

use crate::EmbedError;

/// Transport to a hosted model.
///
/// Implementations ship an already-encoded JSON request body and hand back
/// the raw response body. Faults must be classified: anything that may
/// succeed on a later attempt is [`EmbedError::Service`], everything else is
/// [`EmbedError::Rejected`].
#[async_trait]
pub trait InferenceEndpoint: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    async fn invoke(&self, body: &[u8]) -> Result<Vec<u8>, EmbedError>;
}
