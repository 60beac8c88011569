use serde_json::Value;

use crate::{EmbedError, Embedding};

/// Maximum number of list levels stripped from a model response.
pub const MAX_UNWRAP_DEPTH: usize = 2;

/// Strips up to [`MAX_UNWRAP_DEPTH`] levels of list nesting.
///
/// A level is stripped only when the value is a non-empty list whose first
/// element is itself a list; the result is that first element. Only the
/// first element is inspected, so ragged batches are not detected here.
/// Non-list values pass through untouched.
pub fn normalize_response(response: Value) -> Value {
    let mut current = response;
    for _ in 0..MAX_UNWRAP_DEPTH {
        current = match current {
            Value::Array(items) if matches!(items.first(), Some(Value::Array(_))) => {
                items.into_iter().next().unwrap_or_default()
            }
            other => return other,
        };
    }
    current
}

/// Validates a normalized response into an [`Embedding`].
///
/// Non-lists and empty lists are [`EmbedError::InvalidEmbedding`]; a list
/// holding anything other than numbers (including nested lists left over
/// from deeper responses) is [`EmbedError::Protocol`].
pub fn into_embedding(value: Value) -> Result<Embedding, EmbedError> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(EmbedError::InvalidEmbedding(format!(
                "expected a list of numbers, got {}",
                kind(&other)
            )))
        }
    };

    let values = items
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| match entry {
            Value::Number(n) => n.as_f64().map(|v| v as f32).ok_or_else(|| {
                EmbedError::Protocol(format!("embedding entry {idx} is not representable"))
            }),
            other => Err(EmbedError::Protocol(format!(
                "embedding entry {idx} is {}, expected a number",
                kind(&other)
            ))),
        })
        .collect::<Result<Vec<f32>, _>>()?;

    Embedding::new(values)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
