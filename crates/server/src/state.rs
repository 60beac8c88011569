use crate::config::ServerConfig;
use dashmap::DashMap;
use semdex::Pipeline;
use std::sync::Arc;
use std::time::{Duration, Instant};

const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Requests seen for one key in the current window.
#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    used: u32,
}

/// Shared by every handler. Cloning is cheap.
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<ServerConfig>,
    pub pipeline: Arc<Pipeline>,
    windows: Arc<DashMap<String, Window>>,
}

impl ServerState {
    pub fn new(config: ServerConfig, pipeline: Pipeline) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            windows: Arc::new(DashMap::new()),
        }
    }

    pub fn is_valid_api_key(&self, key: &str) -> bool {
        self.config.api_keys.contains(key)
    }

    /// Counts one request against `key`; false once the key's budget for
    /// the current minute is spent.
    pub fn check_rate_limit(&self, key: &str) -> bool {
        self.admit(key, Instant::now())
    }

    fn admit(&self, key: &str, now: Instant) -> bool {
        let mut window = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            used: 0,
        });

        if now.duration_since(window.started) > RATE_WINDOW {
            *window = Window {
                started: now,
                used: 0,
            };
        }

        if window.used >= self.config.rate_limit_per_minute {
            return false;
        }
        window.used += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embed::{EmbeddingClient, StubEndpoint};
    use semdex::VectorStore;
    use store::MemoryIndex;

    fn state(limit: u32) -> ServerState {
        let pipeline = Pipeline::new(
            Arc::new(EmbeddingClient::new(Arc::new(StubEndpoint::new(4)))),
            VectorStore::new(Arc::new(MemoryIndex::new("b", "i", 4))),
        );
        let config = ServerConfig {
            rate_limit_per_minute: limit,
            ..ServerConfig::default()
        };
        ServerState::new(config, pipeline)
    }

    #[test]
    fn budget_is_per_key() {
        let state = state(2);
        let now = Instant::now();
        assert!(state.admit("a", now));
        assert!(state.admit("a", now));
        assert!(!state.admit("a", now));
        assert!(state.admit("b", now));
    }

    #[test]
    fn budget_resets_after_window() {
        let state = state(1);
        let now = Instant::now();
        assert!(state.admit("a", now));
        assert!(!state.admit("a", now));
        assert!(state.admit("a", now + RATE_WINDOW + Duration::from_secs(1)));
    }
}
