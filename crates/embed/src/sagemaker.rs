use async_trait::async_trait;
use aws_sdk_sagemakerruntime::config::Region;
use aws_sdk_sagemakerruntime::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_sagemakerruntime::primitives::Blob;
use aws_sdk_sagemakerruntime::Client;
use tracing::debug;

use crate::{EmbedError, InferenceEndpoint};

/// SageMaker runtime endpoint serving a feature-extraction model.
#[derive(Debug, Clone)]
pub struct SageMakerEndpoint {
    client: Client,
    endpoint_name: String,
}

impl SageMakerEndpoint {
    pub fn new(client: Client, endpoint_name: impl Into<String>) -> Self {
        Self {
            client,
            endpoint_name: endpoint_name.into(),
        }
    }

    /// Builds a client from the ambient AWS credential chain.
    pub async fn from_env(endpoint_name: impl Into<String>, region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let shared = loader.load().await;
        Self::new(Client::new(&shared), endpoint_name)
    }
}

#[async_trait]
impl InferenceEndpoint for SageMakerEndpoint {
    fn name(&self) -> &str {
        &self.endpoint_name
    }

    async fn invoke(&self, body: &[u8]) -> Result<Vec<u8>, EmbedError> {
        let output = self
            .client
            .invoke_endpoint()
            .endpoint_name(&self.endpoint_name)
            .content_type("application/json")
            .body(Blob::new(body.to_vec()))
            .send()
            .await
            .map_err(|err| {
                let code = err
                    .as_service_error()
                    .and_then(|e| e.code())
                    .unwrap_or("unknown")
                    .to_string();
                let message = format!("{code}: {}", DisplayErrorContext(&err));
                debug!(endpoint = %self.endpoint_name, %code, "sagemaker_invoke_failed");
                match err {
                    SdkError::ConstructionFailure(_) => {
                        EmbedError::rejected(&self.endpoint_name, message)
                    }
                    _ => EmbedError::service(&self.endpoint_name, message),
                }
            })?;

        output
            .body()
            .map(|blob| blob.as_ref().to_vec())
            .ok_or_else(|| EmbedError::Protocol("SageMaker response carried no body".into()))
    }
}
