use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{MemoryIndex, QueryMatch, StoreError, TopK, VectorRecord};

/// A remote (or fake) vector index addressed by bucket and index name.
///
/// Implementations classify faults into [`StoreError`] and never retry;
/// [`crate::VectorStore`] owns retry.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    fn bucket(&self) -> &str;
    fn index(&self) -> &str;

    /// Inserts or replaces one record.
    async fn put(&self, record: &VectorRecord) -> Result<(), StoreError>;

    /// Nearest neighbours of `vector`, closest first, with distance and
    /// metadata.
    async fn query(&self, vector: &[f32], top_k: TopK) -> Result<Vec<QueryMatch>, StoreError>;
}

/// Configuration for selecting and building a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Amazon S3 Vectors. Requires the `aws` feature.
    S3Vectors {
        bucket: String,
        index: String,
        #[serde(default)]
        region: Option<String>,
    },
    /// Process-local fake with a fixed dimension.
    InMemory {
        bucket: String,
        index: String,
        dimension: usize,
    },
}

impl BackendConfig {
    pub fn in_memory(bucket: impl Into<String>, index: impl Into<String>, dimension: usize) -> Self {
        BackendConfig::InMemory {
            bucket: bucket.into(),
            index: index.into(),
            dimension,
        }
    }

    pub fn s3_vectors(bucket: impl Into<String>, index: impl Into<String>) -> Self {
        BackendConfig::S3Vectors {
            bucket: bucket.into(),
            index: index.into(),
            region: None,
        }
    }

    pub async fn build(&self) -> Result<Arc<dyn VectorIndex>, StoreError> {
        match self {
            BackendConfig::InMemory {
                bucket,
                index,
                dimension,
            } => Ok(Arc::new(MemoryIndex::new(
                bucket.clone(),
                index.clone(),
                *dimension,
            ))),
            BackendConfig::S3Vectors {
                bucket,
                index,
                region,
            } => {
                #[cfg(feature = "aws")]
                {
                    Ok(Arc::new(
                        crate::S3VectorsIndex::from_env(bucket.clone(), index.clone(), region.clone())
                            .await,
                    ))
                }
                #[cfg(not(feature = "aws"))]
                {
                    let _ = (bucket, index, region);
                    Err(StoreError::Protocol(
                        "s3vectors backend disabled at compile time".into(),
                    ))
                }
            }
        }
    }
}
