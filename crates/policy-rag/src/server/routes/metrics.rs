//! Service metrics endpoint

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::MetricsResponse;

/// GET /api/metrics - Document counts and latency statistics
pub async fn metrics(State(state): State<AppState>) -> Result<Json<MetricsResponse>> {
    let stats = state.engine().stats();
    Ok(Json(MetricsResponse {
        total_docs: stats.total_docs,
        total_chunks: stats.total_chunks,
        avg_retrieval_latency_ms: stats.avg_retrieval_latency_ms,
        avg_generation_latency_ms: stats.avg_generation_latency_ms,
        embedding_model: stats.embedding_model,
        llm_model: stats.llm_model,
    }))
}
