//! semdex server - HTTP handlers for document ingestion and semantic search
//!
//! This crate exposes the semdex pipeline over HTTP:
//!
//! - **Ingestion**: embed one document and store it in the vector index
//! - **Search**: embed a query and return the nearest documents
//! - **Health**: liveness and readiness probes
//!
//! # Features
//!
//! - **Authentication**: optional API keys with per-key rate limiting
//! - **Middleware**: Compression, CORS, request ID tracking, structured logging
//! - **Configuration**: `SEMDEX_SERVER__*` environment variables or `server.*` file
//! - **Error Handling**: every pipeline failure maps to a distinct status
//! - **Graceful Shutdown**: SIGTERM and Ctrl+C
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use semdex::AppConfig;
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     let app_config = AppConfig::load()?;
//!     server::start_server(config, app_config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! ## Public Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//!
//! ## Document Endpoints (API key required when keys are configured)
//!
//! - `POST /ingest` - `{text, metadata?}` → `{message, document_id}`
//! - `POST /search` - `{query, k?}` → `{results, count}`
//!
//! | Failure | Status | Code |
//! |---------|--------|------|
//! | missing `text` / `query`, malformed body | 400 | `MISSING_FIELD` / `BAD_REQUEST` |
//! | index or bucket missing | 404 | `INDEX_NOT_FOUND` |
//! | access denied | 403 | `ACCESS_DENIED` |
//! | invalid embedding | 500 | `INVALID_EMBEDDING` |
//! | anything else | 500 | `EMBEDDING_FAILED` / `STORE_FAILED` |

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
