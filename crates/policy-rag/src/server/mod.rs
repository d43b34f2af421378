//! HTTP server for the RAG service

pub mod routes;
pub mod state;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::RagConfig;
use crate::error::Result;
use state::AppState;

/// RAG HTTP server
pub struct RagServer {
    config: RagConfig,
    state: AppState,
}

impl RagServer {
    /// Create a new server, building the engine from configuration
    pub async fn new(config: RagConfig) -> Self {
        let state = AppState::new(config.clone()).await;
        Self { config, state }
    }

    /// Build the router with all routes
    fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/", get(root))
            .route("/health", get(health_check))
            .nest("/api", routes::api_routes())
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.server.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router = router.layer(cors);
        }

        router
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.server.host, self.config.server.port)
            .parse()
            .map_err(|e| crate::error::Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.build_router();

        tracing::info!("Starting RAG server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| crate::error::Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| crate::error::Error::internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Root endpoint with API information
async fn root() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "policy-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Policy and product Q&A with source citations",
        "endpoints": {
            "GET /health": "Liveness check",
            "POST /api/ingest": "Load and index the document corpus",
            "POST /api/ask": "Ask a question, get an answer with citations",
            "GET /api/metrics": "Document counts and latency statistics"
        }
    }))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
