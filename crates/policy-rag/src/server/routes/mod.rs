//! API routes for the RAG server

pub mod ask;
pub mod ingest;
pub mod metrics;

use axum::{
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ingest", post(ingest::ingest))
        .route("/ask", post(ask::ask))
        .route("/metrics", get(metrics::metrics))
        .route("/health", get(health))
}

/// Health check endpoint
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
