use async_trait::async_trait;
use fxhash::hash64;
use serde_json::{json, Value};

use crate::{EmbedError, InferenceEndpoint};

/// Deterministic offline endpoint.
///
/// Produces sinusoid values derived from a hash of each whitespace token, so
/// identical inputs give identical vectors and texts sharing words end up
/// closer under cosine distance. The response is wrapped in `nesting` extra
/// list levels to mimic feature-extraction servers.
#[derive(Debug, Clone)]
pub struct StubEndpoint {
    name: String,
    dimension: usize,
    nesting: usize,
}

impl StubEndpoint {
    pub fn new(dimension: usize) -> Self {
        Self {
            name: "stub".to_string(),
            dimension,
            nesting: 0,
        }
    }

    pub fn with_nesting(mut self, nesting: usize) -> Self {
        self.nesting = nesting;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dimension];
        for token in text.split_whitespace() {
            let h = hash64(token.to_lowercase().as_bytes());
            for (idx, value) in v.iter_mut().enumerate() {
                *value += ((h >> (idx % 32)) as f32 * 0.0001).sin();
            }
        }
        l2_normalize_in_place(&mut v);
        v
    }
}

#[async_trait]
impl InferenceEndpoint for StubEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, body: &[u8]) -> Result<Vec<u8>, EmbedError> {
        let request: Value = serde_json::from_slice(body)
            .map_err(|e| EmbedError::rejected(&self.name, format!("request is not JSON: {e}")))?;
        let text = request
            .get("inputs")
            .and_then(Value::as_str)
            .ok_or_else(|| EmbedError::rejected(&self.name, "request has no string `inputs`"))?;

        let mut response = json!(self.vector_for(text));
        for _ in 0..self.nesting {
            response = Value::Array(vec![response]);
        }
        serde_json::to_vec(&response).map_err(|e| EmbedError::Protocol(e.to_string()))
    }
}

fn l2_normalize_in_place(v: &mut [f32]) {
    let norm_sq: f32 = v.iter().map(|x| x * x).sum();
    if norm_sq > 0.0 {
        let inv_norm = norm_sq.sqrt().recip();
        for x in v.iter_mut() {
            *x *= inv_norm;
        }
    }
}
