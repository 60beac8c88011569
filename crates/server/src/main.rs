//! semdex server - HTTP handlers for document ingestion and semantic search
//!
//! Configuration is read once at startup; a missing `SAGEMAKER_ENDPOINT`,
//! `VECTOR_BUCKET` or `INDEX_NAME` stops the process before it binds.

use semdex::AppConfig;
use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::load()?;
    let app_config = AppConfig::load()?;

    // Start server
    server::start_server(config, app_config).await?;

    Ok(())
}
