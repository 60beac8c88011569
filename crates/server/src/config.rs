use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

/// HTTP listener settings, read from `server.{toml,yaml,json}` and
/// `SEMDEX_SERVER__*` variables. Missing fields take their defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,

    /// Whole-request budget in seconds, embedding and store retries included.
    pub timeout_secs: u64,

    pub max_body_size_mb: usize,

    /// Requests per minute allowed for each API key.
    pub rate_limit_per_minute: u32,

    /// Accepted keys. Empty means no authentication.
    pub api_keys: HashSet<String>,

    pub enable_cors: bool,

    /// `EnvFilter` directive for the JSON logger.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".into(),
            port: 8080,
            timeout_secs: 30,
            max_body_size_mb: 1,
            rate_limit_per_minute: 100,
            api_keys: HashSet::new(),
            enable_cors: true,
            log_level: "info".into(),
        }
    }
}

impl ServerConfig {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_sources(
            config::Config::builder()
                .add_source(config::File::with_name("server").required(false))
                .add_source(
                    config::Environment::with_prefix("SEMDEX_SERVER")
                        .prefix_separator("__")
                        .separator("__")
                        .try_parsing(true)
                        .list_separator(",")
                        .with_list_parse_key("api_keys"),
                )
                .build()?,
        )
    }

    /// Deserializes an already assembled source stack.
    pub fn from_sources(source: config::Config) -> anyhow::Result<Self> {
        let cfg: ServerConfig = source.try_deserialize()?;
        if cfg.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be positive");
        }
        Ok(cfg)
    }

    pub fn auth_enabled(&self) -> bool {
        !self.api_keys.is_empty()
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.bind_addr, self.port).parse()?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Body limit in bytes.
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}
