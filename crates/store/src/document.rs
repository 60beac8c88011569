//! Conversion between JSON metadata and the smithy `Document` type used by
//! the S3 Vectors API.

use std::collections::HashMap;

use aws_smithy_types::{Document, Number};
use serde_json::Value;

use crate::Metadata;

pub(crate) fn metadata_to_document(metadata: &Metadata) -> Document {
    Document::Object(
        metadata
            .iter()
            .map(|(k, v)| (k.clone(), json_to_document(v)))
            .collect::<HashMap<_, _>>(),
    )
}

pub(crate) fn json_to_document(value: &Value) -> Document {
    match value {
        Value::Null => Document::Null,
        Value::Bool(b) => Document::Bool(*b),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Document::Number(Number::PosInt(u))
            } else if let Some(i) = n.as_i64() {
                Document::Number(Number::NegInt(i))
            } else {
                Document::Number(Number::Float(n.as_f64().unwrap_or_default()))
            }
        }
        Value::String(s) => Document::String(s.clone()),
        Value::Array(items) => Document::Array(items.iter().map(json_to_document).collect()),
        Value::Object(map) => Document::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_document(v)))
                .collect(),
        ),
    }
}

pub(crate) fn document_to_json(document: &Document) -> Value {
    match document {
        Document::Null => Value::Null,
        Document::Bool(b) => Value::Bool(*b),
        Document::Number(Number::PosInt(u)) => Value::from(*u),
        Document::Number(Number::NegInt(i)) => Value::from(*i),
        Document::Number(Number::Float(f)) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Document::String(s) => Value::String(s.clone()),
        Document::Array(items) => Value::Array(items.iter().map(document_to_json).collect()),
        Document::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), document_to_json(v)))
                .collect(),
        ),
    }
}

/// Metadata must come back as an object; anything else is a protocol fault.
pub(crate) fn document_to_metadata(document: &Document) -> Option<Metadata> {
    match document_to_json(document) {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metadata_survives_conversion() {
        let value = json!({
            "character": "Gru",
            "movie": "Despicable Me",
            "year": 2010,
            "offset": -4,
            "rating": 4.5,
            "tags": ["villain", "dad"],
            "extra": null,
            "active": true
        });
        let Value::Object(metadata) = value else {
            unreachable!()
        };

        let doc = metadata_to_document(&metadata);
        assert_eq!(document_to_metadata(&doc), Some(metadata));
    }

    #[test]
    fn non_object_document_is_not_metadata() {
        assert_eq!(document_to_metadata(&Document::String("x".into())), None);
    }
}
