//! Application state for the RAG server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::engine::RagEngine;

/// Shared application state: the configuration and the one engine instance,
/// injected into every handler
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RagConfig,
    engine: RagEngine,
}

impl AppState {
    /// Create state from configuration, building the engine's providers
    pub async fn new(config: RagConfig) -> Self {
        let engine = RagEngine::from_config(&config).await;
        Self::with_engine(config, engine)
    }

    /// Create state around an existing engine. Tests use this to inject
    /// deterministic providers.
    pub fn with_engine(config: RagConfig, engine: RagEngine) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, engine }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the engine
    pub fn engine(&self) -> &RagEngine {
        &self.inner.engine
    }
}
