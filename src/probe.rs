//! Model dimension check: embed a few probe texts and compare shapes.

use embed::Embedder;
use serde::Serialize;

/// Texts embedded by `semdex check-dims` when none are given.
/// They vary length, punctuation and script to catch length-dependent output.
pub const DEFAULT_PROBES: [&str; 5] = [
    "Short text",
    "This is a medium length sentence with several words to test embedding consistency.",
    "This is a much longer piece of text that contains multiple sentences and various concepts. \
     It includes technical terms, common words, and different linguistic structures to thoroughly \
     test the embedding model's capability to process diverse content types and maintain \
     consistent output dimensions regardless of input length or complexity.",
    "🍌 Emoji and special characters: @#$%^&*()",
    "Multilingual test: Hello, Hola, Bonjour, Guten Tag, 你好",
];

/// Shape of one successful probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeStats {
    pub dimension: usize,
    /// Up to the first three components.
    pub head: Vec<f32>,
    pub min: f32,
    pub max: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Probe {
    pub text: String,
    pub outcome: Result<ProbeStats, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionReport {
    pub probes: Vec<Probe>,
}

impl DimensionReport {
    /// Distinct dimensions observed, in first-seen order.
    pub fn dimensions(&self) -> Vec<usize> {
        let mut seen = Vec::new();
        for probe in &self.probes {
            if let Ok(stats) = &probe.outcome {
                if !seen.contains(&stats.dimension) {
                    seen.push(stats.dimension);
                }
            }
        }
        seen
    }

    /// The common dimension when every probe succeeded with the same one.
    pub fn consistent_dimension(&self) -> Option<usize> {
        if self.probes.iter().any(|p| p.outcome.is_err()) {
            return None;
        }
        match self.dimensions().as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

/// Embeds each text in order and records its shape or failure.
pub async fn probe_dimensions<S: AsRef<str>>(embedder: &dyn Embedder, texts: &[S]) -> DimensionReport {
    let mut probes = Vec::with_capacity(texts.len());
    for text in texts {
        let text = text.as_ref();
        let outcome = embedder
            .embed(text)
            .await
            .map(|embedding| {
                let (min, max) = embedding.range();
                ProbeStats {
                    dimension: embedding.dimension(),
                    head: embedding.as_slice().iter().take(3).copied().collect(),
                    min,
                    max,
                }
            })
            .map_err(|err| err.to_string());
        probes.push(Probe {
            text: text.to_string(),
            outcome,
        });
    }
    DimensionReport { probes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use embed::{EmbedError, Embedding};

    /// Embeds to a vector whose length is the text length.
    struct LengthEmbedder;

    #[async_trait]
    impl Embedder for LengthEmbedder {
        async fn embed(&self, text: &str) -> Result<Embedding, EmbedError> {
            Embedding::new(vec![0.5; text.len()])
        }
    }

    #[tokio::test]
    async fn consistent_when_all_dimensions_match() {
        let report = probe_dimensions(&LengthEmbedder, &["abc", "xyz"]).await;
        assert_eq!(report.consistent_dimension(), Some(3));
        let stats = report.probes[0].outcome.as_ref().unwrap();
        assert_eq!(stats.head, vec![0.5, 0.5, 0.5]);
        assert_eq!((stats.min, stats.max), (0.5, 0.5));
    }

    #[tokio::test]
    async fn inconsistent_dimensions_are_reported() {
        let report = probe_dimensions(&LengthEmbedder, &["ab", "abcd"]).await;
        assert_eq!(report.consistent_dimension(), None);
        assert_eq!(report.dimensions(), vec![2, 4]);
    }

    #[tokio::test]
    async fn failures_are_recorded_per_probe() {
        let report = probe_dimensions(&LengthEmbedder, &["", "abc"]).await;
        assert!(report.probes[0].outcome.is_err());
        assert!(report.probes[1].outcome.is_ok());
        assert_eq!(report.consistent_dimension(), None);
    }
}
