//! Semantic document indexing.
//!
//! `semdex` ingests text documents into a managed vector index and searches
//! them by meaning. Each text is embedded by a hosted model (SageMaker by
//! default), stored with its metadata (S3 Vectors by default), and found
//! again by embedding a query the same way.
//!
//! The workspace crates do the remote work:
//!
//! - `embed`: inference endpoints, response normalization, embedding retry;
//! - `store`: the vector store gateway and its fault classification;
//! - `resilience`: the shared retry policy.
//!
//! This crate wires them into a [`Pipeline`] and adds the flows on top:
//!
//! ```no_run
//! use semdex::{AppConfig, Pipeline, RawDocument, TopK};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = AppConfig::load()?;
//! let pipeline = Pipeline::from_config(&cfg).await?;
//!
//! let receipt = pipeline
//!     .ingest(RawDocument {
//!         text: Some("Gru is a supervillain".into()),
//!         metadata: None,
//!     })
//!     .await?;
//! println!("stored {}", receipt.document_id);
//!
//! for hit in pipeline.search("villain", TopK::default()).await? {
//!     println!("{:.4} {}", hit.score, hit.preview());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod document;
mod error;
pub mod ingest;
mod pipeline;
pub mod probe;
pub mod search;

pub use crate::config::{AppConfig, ConfigError, EmbeddingBackend, StoreBackend};
pub use crate::document::{load_documents, Document, LoadError, Metadata, RawDocument};
pub use crate::error::PipelineError;
pub use crate::ingest::{BatchFailure, BatchSummary, IngestOptions, IngestReceipt};
pub use crate::pipeline::Pipeline;
pub use crate::search::{CharacterSearch, SearchHit};

pub use embed::{EmbedError, Embedder, Embedding, EmbeddingClient};
pub use resilience::{RetryPolicy, Sleeper};
pub use store::{StoreError, TopK, VectorStore};
