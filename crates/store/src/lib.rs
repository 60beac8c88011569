//! # semdex store
//!
//! Gateway to a remote vector index. It does exactly two things: upsert one
//! record, and ask for the top-K nearest neighbours of a vector.
//!
//! The gateway ([`VectorStore`]) owns retry and logging; backends behind the
//! [`VectorIndex`] trait only translate calls and classify faults into
//! [`StoreError`]:
//!
//! | Fault | Error | Retried |
//! |-------|-------|---------|
//! | throttling, 5xx, transport | [`StoreError::Service`] | yes |
//! | index or bucket missing | [`StoreError::IndexNotFound`] | no |
//! | permission denied | [`StoreError::AccessDenied`] | no |
//! | request rejected (e.g. wrong dimension) | [`StoreError::Validation`] | no |
//! | unexpected response shape | [`StoreError::Protocol`] | no |
//!
//! Query results come back in store order and are never re-sorted here.

mod backend;
#[cfg(feature = "aws")]
mod document;
mod error;
mod gateway;
mod memory;
#[cfg(feature = "aws")]
mod s3vectors;
mod types;

pub use crate::backend::{BackendConfig, VectorIndex};
pub use crate::error::{classify_fault, StoreError};
pub use crate::gateway::VectorStore;
pub use crate::memory::MemoryIndex;
#[cfg(feature = "aws")]
pub use crate::s3vectors::S3VectorsIndex;
pub use crate::types::{Metadata, QueryMatch, TopK, VectorRecord, DEFAULT_TOP_K, MAX_TOP_K};
