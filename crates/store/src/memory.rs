use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::{QueryMatch, StoreError, TopK, VectorIndex, VectorRecord};

/// An in-memory index using a `RwLock` around a `HashMap`.
///
/// Distances are cosine distances (`1 - cosine similarity`), so
/// `similarity = 1 - distance` is the cosine similarity. Vectors whose length
/// differs from the configured dimension are rejected the way a real index
/// rejects them.
pub struct MemoryIndex {
    bucket: String,
    index: String,
    dimension: usize,
    records: RwLock<HashMap<String, VectorRecord>>,
}

impl MemoryIndex {
    pub fn new(bucket: impl Into<String>, index: impl Into<String>, dimension: usize) -> Self {
        Self {
            bucket: bucket.into(),
            index: index.into(),
            dimension,
            records: RwLock::new(HashMap::new()),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &str) -> Option<VectorRecord> {
        self.records
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    fn check_dimension(&self, len: usize) -> Result<(), StoreError> {
        if len != self.dimension {
            return Err(StoreError::Validation(format!(
                "vector dimension {len} does not match index dimension {}",
                self.dimension
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn index(&self) -> &str {
        &self.index
    }

    async fn put(&self, record: &VectorRecord) -> Result<(), StoreError> {
        self.check_dimension(record.vector.len())?;
        self.records
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(record.key.clone(), record.clone());
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: TopK) -> Result<Vec<QueryMatch>, StoreError> {
        self.check_dimension(vector.len())?;
        let records = self
            .records
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut matches: Vec<QueryMatch> = records
            .values()
            .map(|record| QueryMatch {
                key: record.key.clone(),
                distance: cosine_distance(vector, &record.vector),
                metadata: record.metadata.clone(),
            })
            .collect();
        matches.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.key.cmp(&b.key))
        });
        matches.truncate(top_k.get() as usize);
        Ok(matches)
    }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    (1.0 - dot / (norm_a * norm_b)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Metadata;
    use serde_json::json;

    fn record(key: &str, vector: Vec<f32>, tag: &str) -> VectorRecord {
        let mut metadata = Metadata::new();
        metadata.insert("tag".into(), json!(tag));
        VectorRecord {
            key: key.into(),
            vector,
            metadata,
        }
    }

    #[tokio::test]
    async fn query_orders_by_distance() {
        let index = MemoryIndex::new("b", "i", 2);
        index.put(&record("far", vec![0.0, 1.0], "far")).await.unwrap();
        index.put(&record("near", vec![1.0, 0.1], "near")).await.unwrap();
        index.put(&record("exact", vec![1.0, 0.0], "exact")).await.unwrap();

        let hits = index.query(&[1.0, 0.0], TopK::new(2).unwrap()).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].key, "exact");
        assert!(hits[0].distance.abs() < 1e-6);
        assert_eq!(hits[1].key, "near");
        assert_eq!(hits[1].metadata["tag"], "near");
    }

    #[tokio::test]
    async fn put_replaces_existing_key() {
        let index = MemoryIndex::new("b", "i", 2);
        index.put(&record("k", vec![1.0, 0.0], "old")).await.unwrap();
        index.put(&record("k", vec![0.0, 1.0], "new")).await.unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("k").unwrap().metadata["tag"], "new");
    }

    #[tokio::test]
    async fn dimension_mismatch_is_validation_error() {
        let index = MemoryIndex::new("b", "i", 3);
        let err = index.put(&record("k", vec![1.0], "x")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let err = index.query(&[1.0, 0.0], TopK::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(index.is_empty());
    }

    #[test]
    fn zero_vectors_are_maximally_distant() {
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }
}
