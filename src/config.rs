//! Application configuration.
//!
//! Values are read once at startup from, in increasing priority:
//!
//! 1. built-in defaults,
//! 2. an optional `semdex.{toml,yaml,json}` file in the working directory,
//! 3. a `.env` file (loaded into the environment by `dotenvy`),
//! 4. process environment variables, unprefixed.
//!
//! ## Example `.env`
//!
//! ```text
//! SAGEMAKER_ENDPOINT=minilm-embeddings
//! VECTOR_BUCKET=despicable-vectors
//! INDEX_NAME=characters
//! AWS_REGION=us-east-1
//! ```
//!
//! The three identifiers above are required. [`AppConfig::load`] fails when
//! any of them is missing, so a misconfigured process never starts.

use resilience::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use embed::EndpointConfig;
use store::BackendConfig;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set; export it or add it to .env")]
    Missing(&'static str),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to read configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Where embeddings come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmbeddingBackend {
    #[default]
    #[serde(rename = "sagemaker")]
    SageMaker,
    #[serde(rename = "http")]
    Http,
    #[serde(rename = "stub")]
    Stub,
}

/// Where vectors are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StoreBackend {
    #[default]
    #[serde(rename = "s3vectors")]
    S3Vectors,
    #[serde(rename = "memory")]
    Memory,
}

/// Process-wide settings, constructed once and passed by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Inference endpoint name (`SAGEMAKER_ENDPOINT`).
    #[serde(default)]
    pub sagemaker_endpoint: String,

    /// Vector bucket (`VECTOR_BUCKET`).
    #[serde(default)]
    pub vector_bucket: String,

    /// Vector index within the bucket (`INDEX_NAME`).
    #[serde(default)]
    pub index_name: String,

    /// AWS region; the SDK default chain is used when unset.
    #[serde(default)]
    pub aws_region: Option<String>,

    #[serde(default)]
    pub embedding_backend: EmbeddingBackend,

    /// URL for the `http` embedding backend.
    #[serde(default)]
    pub embedding_url: Option<String>,

    /// Full `Authorization` header for the `http` embedding backend.
    #[serde(default)]
    pub embedding_auth_header: Option<String>,

    #[serde(default = "default_embedding_timeout_secs")]
    pub embedding_timeout_secs: u64,

    /// Vector length produced by the `stub` embedding backend.
    #[serde(default = "default_dimension")]
    pub stub_dimension: usize,

    #[serde(default)]
    pub store_backend: StoreBackend,

    /// Dimension of the `memory` store backend.
    #[serde(default = "default_dimension")]
    pub memory_dimension: usize,

    /// Attempts per remote call, including the first.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Delay before the first retry, doubled afterwards.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Fold the document text into the stored metadata.
    #[serde(default = "default_true")]
    pub include_text: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sagemaker_endpoint: String::new(),
            vector_bucket: String::new(),
            index_name: String::new(),
            aws_region: None,
            embedding_backend: EmbeddingBackend::default(),
            embedding_url: None,
            embedding_auth_header: None,
            embedding_timeout_secs: default_embedding_timeout_secs(),
            stub_dimension: default_dimension(),
            store_backend: StoreBackend::default(),
            memory_dimension: default_dimension(),
            retry_attempts: default_retry_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            include_text: default_true(),
        }
    }
}

impl AppConfig {
    /// Loads `.env`, the optional `semdex.*` file and the environment, then
    /// validates.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                tracing::warn!(error = %err, "dotenv_load_failed");
            }
        }

        let builder = config::Config::builder()
            .add_source(config::File::with_name("semdex").required(false))
            .add_source(config::Environment::default().try_parsing(true));
        Self::from_config(builder.build()?)
    }

    /// Deserializes and validates an already-built configuration.
    pub fn from_config(source: config::Config) -> Result<Self, ConfigError> {
        let cfg: AppConfig = source.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("SAGEMAKER_ENDPOINT", &self.sagemaker_endpoint),
            ("VECTOR_BUCKET", &self.vector_bucket),
            ("INDEX_NAME", &self.index_name),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(name));
            }
        }

        if self.embedding_backend == EmbeddingBackend::Http
            && self.embedding_url.as_deref().is_none_or(|u| u.trim().is_empty())
        {
            return Err(ConfigError::Missing("EMBEDDING_URL"));
        }
        if self.embedding_backend == EmbeddingBackend::Stub && self.stub_dimension == 0 {
            return Err(ConfigError::Invalid(
                "stub_dimension must be greater than zero".into(),
            ));
        }
        if self.store_backend == StoreBackend::Memory && self.memory_dimension == 0 {
            return Err(ConfigError::Invalid(
                "memory_dimension must be greater than zero".into(),
            ));
        }
        if self.retry_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn endpoint_config(&self) -> EndpointConfig {
        match self.embedding_backend {
            EmbeddingBackend::SageMaker => EndpointConfig::SageMaker {
                endpoint_name: self.sagemaker_endpoint.clone(),
                region: self.aws_region.clone(),
            },
            EmbeddingBackend::Http => EndpointConfig::Http {
                name: self.sagemaker_endpoint.clone(),
                url: self.embedding_url.clone().unwrap_or_default(),
                auth_header: self.embedding_auth_header.clone(),
                timeout_secs: self.embedding_timeout_secs,
            },
            EmbeddingBackend::Stub => EndpointConfig::Stub {
                name: self.sagemaker_endpoint.clone(),
                dimension: self.stub_dimension,
            },
        }
    }

    pub fn backend_config(&self) -> BackendConfig {
        match self.store_backend {
            StoreBackend::S3Vectors => BackendConfig::S3Vectors {
                bucket: self.vector_bucket.clone(),
                index: self.index_name.clone(),
                region: self.aws_region.clone(),
            },
            StoreBackend::Memory => BackendConfig::in_memory(
                self.vector_bucket.clone(),
                self.index_name.clone(),
                self.memory_dimension,
            ),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(self.retry_attempts)
            .with_base_delay(Duration::from_millis(self.retry_base_delay_ms))
    }
}

fn default_embedding_timeout_secs() -> u64 {
    embed::DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_dimension() -> usize {
    384
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}
