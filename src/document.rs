use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use store::Metadata;

use crate::PipelineError;

/// Timestamp layout stored under `timestamp`: ISO-8601 UTC with microseconds
/// and no offset suffix.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// A text document ready for ingestion. `text` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub text: String,
    pub metadata: Metadata,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Result<Self, PipelineError> {
        RawDocument {
            text: Some(text.into()),
            metadata: None,
        }
        .into_document()
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Document as received from a file or request body, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl RawDocument {
    pub fn text_len(&self) -> usize {
        self.text.as_deref().map_or(0, str::len)
    }

    pub fn into_document(self) -> Result<Document, PipelineError> {
        match self.text {
            Some(text) if !text.is_empty() => Ok(Document {
                text,
                metadata: self.metadata.unwrap_or_default(),
            }),
            _ => Err(PipelineError::MissingText),
        }
    }
}

/// Formats an ingestion time for the `timestamp` metadata field.
pub fn ingestion_timestamp(now: DateTime<Utc>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// Builds the metadata stored with a vector.
///
/// Returns a new map: the caller's metadata, then `timestamp`, then `text`
/// when `include_text` is set. Injected fields overwrite caller fields of the
/// same name.
pub fn record_metadata(doc: &Document, include_text: bool, now: DateTime<Utc>) -> Metadata {
    let mut metadata = doc.metadata.clone();
    metadata.insert(
        "timestamp".to_string(),
        Value::String(ingestion_timestamp(now)),
    );
    if include_text {
        metadata.insert("text".to_string(), Value::String(doc.text.clone()));
    }
    metadata
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{path} is not a JSON array of documents: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads a JSON array of `{text, metadata?}` objects.
pub fn load_documents(path: impl AsRef<Path>) -> Result<Vec<RawDocument>, LoadError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| LoadError::Parse {
        path: display,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::io::Write;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    fn metadata(value: Value) -> Metadata {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn timestamp_matches_iso_layout() {
        assert_eq!(ingestion_timestamp(fixed_now()), "2024-03-09T14:05:07.000000");
    }

    #[test]
    fn record_metadata_adds_fields_without_touching_input() {
        let doc = Document::new("Gru is a supervillain")
            .unwrap()
            .with_metadata(metadata(json!({"character": "Gru", "movie": "Despicable Me"})));
        let before = doc.metadata.clone();

        let stored = record_metadata(&doc, true, fixed_now());

        assert_eq!(doc.metadata, before);
        assert_eq!(stored["character"], "Gru");
        assert_eq!(stored["movie"], "Despicable Me");
        assert_eq!(stored["timestamp"], "2024-03-09T14:05:07.000000");
        assert_eq!(stored["text"], "Gru is a supervillain");
        assert_eq!(stored.len(), 4);
    }

    #[test]
    fn text_folding_can_be_disabled() {
        let doc = Document::new("hello").unwrap();
        let stored = record_metadata(&doc, false, fixed_now());
        assert!(!stored.contains_key("text"));
        assert!(stored.contains_key("timestamp"));
    }

    #[test]
    fn injected_fields_win() {
        let doc = Document::new("real text")
            .unwrap()
            .with_metadata(metadata(json!({"timestamp": "yesterday", "text": "stale"})));
        let stored = record_metadata(&doc, true, fixed_now());
        assert_eq!(stored["timestamp"], "2024-03-09T14:05:07.000000");
        assert_eq!(stored["text"], "real text");
    }

    #[test]
    fn empty_or_absent_text_is_rejected() {
        assert_eq!(Document::new(""), Err(PipelineError::MissingText));
        assert_eq!(
            RawDocument::default().into_document(),
            Err(PipelineError::MissingText)
        );
    }

    #[test]
    fn loads_documents_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"text": "Gru is a supervillain", "metadata": {{"character": "Gru"}}}},
                {{"text": "Minions love bananas"}},
                {{"metadata": {{"character": "Vector"}}}}
            ]"#
        )
        .unwrap();

        let docs = load_documents(file.path()).unwrap();

        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].metadata.as_ref().unwrap()["character"], "Gru");
        assert!(docs[1].metadata.is_none());
        assert!(docs[2].text.is_none());
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"text": "not an array"}}"#).unwrap();

        let err = load_documents(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load_documents("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
