use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{EmbedError, HttpEndpoint, InferenceEndpoint, StubEndpoint};

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

/// Which inference endpoint to talk to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EndpointConfig {
    /// SageMaker runtime endpoint (requires the `aws` feature).
    SageMaker {
        endpoint_name: String,
        #[serde(default)]
        region: Option<String>,
    },
    /// JSON-over-HTTP inference server.
    Http {
        name: String,
        url: String,
        #[serde(default)]
        auth_header: Option<String>,
        #[serde(default = "default_http_timeout_secs")]
        timeout_secs: u64,
    },
    /// Deterministic offline vectors.
    Stub { name: String, dimension: usize },
}

impl EndpointConfig {
    pub async fn build(&self) -> Result<Arc<dyn InferenceEndpoint>, EmbedError> {
        match self {
            #[cfg(feature = "aws")]
            EndpointConfig::SageMaker {
                endpoint_name,
                region,
            } => Ok(Arc::new(
                crate::SageMakerEndpoint::from_env(endpoint_name.clone(), region.clone()).await,
            )),
            #[cfg(not(feature = "aws"))]
            EndpointConfig::SageMaker { .. } => Err(EmbedError::InvalidConfig(
                "SageMaker endpoint requested but the `aws` feature is disabled".into(),
            )),
            EndpointConfig::Http {
                name,
                url,
                auth_header,
                timeout_secs,
            } => {
                let mut endpoint = HttpEndpoint::new(url.clone(), Duration::from_secs(*timeout_secs))?
                    .with_name(name.clone());
                if let Some(header) = auth_header {
                    endpoint = endpoint.with_auth_header(header.clone());
                }
                Ok(Arc::new(endpoint))
            }
            EndpointConfig::Stub { name, dimension } => {
                if *dimension == 0 {
                    return Err(EmbedError::InvalidConfig(
                        "stub dimension must be greater than zero".into(),
                    ));
                }
                Ok(Arc::new(StubEndpoint::new(*dimension).with_name(name.clone())))
            }
        }
    }
}
