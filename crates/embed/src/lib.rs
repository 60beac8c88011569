//! # semdex embed
//!
//! Turns a piece of text into an embedding vector by calling an inference
//! endpoint.
//!
//! The crate is split along the same seam the rest of semdex uses: a small
//! transport trait ([`InferenceEndpoint`]) that ships bytes to a model and
//! returns bytes, and a client ([`EmbeddingClient`]) that owns everything
//! else:
//!
//! - the request envelope (`{"inputs": text}`),
//! - retry with exponential backoff for transient endpoint faults,
//! - normalization of the nested list shapes models return,
//! - validation into a typed [`Embedding`].
//!
//! Endpoints shipped here:
//!
//! | Endpoint | Feature | Notes |
//! |----------|---------|-------|
//! | [`SageMakerEndpoint`] | `aws` | SageMaker runtime `InvokeEndpoint` |
//! | [`HttpEndpoint`] | always | Any JSON-over-HTTP inference server |
//! | [`StubEndpoint`] | always | Deterministic offline vectors |
//!
//! ## Normalization
//!
//! Feature-extraction models answer with one of `[v...]`, `[[v...]]` or
//! `[[[v...]]]`. [`normalize_response`] unwraps at most two levels by
//! looking only at the first element; anything deeper is left alone and then
//! rejected by [`into_embedding`].
//!
//! ```
//! use embed::{into_embedding, normalize_response};
//! use serde_json::json;
//!
//! let normalized = normalize_response(json!([[[0.5, 0.25]]]));
//! let embedding = into_embedding(normalized).unwrap();
//! assert_eq!(embedding.as_slice(), &[0.5, 0.25]);
//! ```

mod client;
mod config;
mod endpoint;
mod error;
mod http;
mod normalize;
#[cfg(feature = "aws")]
mod sagemaker;
mod stub;
mod types;

pub use crate::client::{Embedder, EmbeddingClient};
pub use crate::config::{EndpointConfig, DEFAULT_HTTP_TIMEOUT_SECS};
pub use crate::endpoint::InferenceEndpoint;
pub use crate::error::EmbedError;
pub use crate::http::HttpEndpoint;
pub use crate::normalize::{into_embedding, normalize_response, MAX_UNWRAP_DEPTH};
#[cfg(feature = "aws")]
pub use crate::sagemaker::SageMakerEndpoint;
pub use crate::stub::StubEndpoint;
pub use crate::types::Embedding;
