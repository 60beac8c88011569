use async_trait::async_trait;
use aws_sdk_s3vectors::config::Region;
use aws_sdk_s3vectors::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3vectors::types::{PutInputVector, VectorData};
use aws_sdk_s3vectors::Client;
use tracing::debug;

use crate::document::{document_to_metadata, metadata_to_document};
use crate::{classify_fault, Metadata, QueryMatch, StoreError, TopK, VectorIndex, VectorRecord};

/// Amazon S3 Vectors index.
#[derive(Debug, Clone)]
pub struct S3VectorsIndex {
    client: Client,
    bucket: String,
    index: String,
}

impl S3VectorsIndex {
    pub fn new(client: Client, bucket: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            index: index.into(),
        }
    }

    /// Builds a client from the ambient AWS credential chain.
    pub async fn from_env(
        bucket: impl Into<String>,
        index: impl Into<String>,
        region: Option<String>,
    ) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let shared = loader.load().await;
        Self::new(Client::new(&shared), bucket, index)
    }

    fn classify<E, R>(&self, err: SdkError<E, R>) -> StoreError
    where
        E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
        R: std::fmt::Debug + Send + Sync + 'static,
    {
        let message = DisplayErrorContext(&err).to_string();
        if let SdkError::ConstructionFailure(_) = err {
            return StoreError::Protocol(message);
        }
        let code = err.as_service_error().and_then(|e| e.code()).map(str::to_string);
        debug!(
            bucket = %self.bucket,
            index = %self.index,
            code = code.as_deref().unwrap_or("unknown"),
            "s3vectors_fault"
        );
        classify_fault(code.as_deref(), message, &self.bucket, &self.index)
    }
}

#[async_trait]
impl VectorIndex for S3VectorsIndex {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn index(&self) -> &str {
        &self.index
    }

    async fn put(&self, record: &VectorRecord) -> Result<(), StoreError> {
        let vector = PutInputVector::builder()
            .key(&record.key)
            .data(VectorData::Float32(record.vector.clone()))
            .metadata(metadata_to_document(&record.metadata))
            .build()
            .map_err(|e| StoreError::Protocol(format!("invalid vector record: {e}")))?;

        self.client
            .put_vectors()
            .vector_bucket_name(&self.bucket)
            .index_name(&self.index)
            .vectors(vector)
            .send()
            .await
            .map_err(|err| self.classify(err))?;
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: TopK) -> Result<Vec<QueryMatch>, StoreError> {
        let output = self
            .client
            .query_vectors()
            .vector_bucket_name(&self.bucket)
            .index_name(&self.index)
            .query_vector(VectorData::Float32(vector.to_vec()))
            .top_k(top_k.get() as i32)
            .return_distance(true)
            .return_metadata(true)
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        output
            .vectors()
            .iter()
            .map(|hit| {
                let metadata = match hit.metadata() {
                    Some(doc) => document_to_metadata(doc).ok_or_else(|| {
                        StoreError::Protocol(format!(
                            "metadata for key '{}' is not an object",
                            hit.key()
                        ))
                    })?,
                    None => Metadata::new(),
                };
                Ok(QueryMatch {
                    key: hit.key().to_string(),
                    distance: hit.distance().unwrap_or(0.0),
                    metadata,
                })
            })
            .collect()
    }
}
