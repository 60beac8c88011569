use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;

use crate::{EmbedError, InferenceEndpoint};

/// Inference endpoint reached with a plain JSON POST, such as a Hugging Face
/// feature-extraction URL or a self-hosted text-embeddings server.
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    name: String,
    url: String,
    auth_header: Option<String>,
    client: reqwest::Client,
}

impl HttpEndpoint {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, EmbedError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(EmbedError::InvalidConfig(
                "embedding_url is required for the http backend".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(8)
            .build()
            .map_err(|e| EmbedError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            name: url.clone(),
            url,
            auth_header: None,
            client,
        })
    }

    /// Full `Authorization` header value, e.g. `Bearer hf_...`.
    pub fn with_auth_header(mut self, header: impl Into<String>) -> Self {
        self.auth_header = Some(header.into());
        self
    }

    /// Name reported in logs instead of the URL.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl InferenceEndpoint for HttpEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, body: &[u8]) -> Result<Vec<u8>, EmbedError> {
        let mut request = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_vec());
        if let Some(header) = self.auth_header.as_deref() {
            request = request.header(AUTHORIZATION, header);
        }

        let response = request
            .send()
            .await
            .map_err(|e| EmbedError::service(&self.name, format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = format!("HTTP error {status}: {body}");
            return Err(if is_transient(status) {
                EmbedError::service(&self.name, message)
            } else {
                EmbedError::rejected(&self.name, message)
            });
        }

        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|e| {
                EmbedError::service(&self.name, format!("failed to read response body: {e}"))
            })
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}
