//! Question-answering endpoint

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{
    response::{AskMetrics, ChunkView},
    AskRequest, AskResponse, Citation,
};

/// Returned when nothing has been ingested yet. A successful response, not
/// an error.
pub const NO_DOCS_ANSWER: &str = "No documents have been ingested yet. Please go to the \
     Admin panel and click 'Ingest sample docs' first, then try your question again.";

/// Returned when no retrieved chunk clears the relevance threshold
pub const OUT_OF_SCOPE_ANSWER: &str = "That topic is outside my current scope. I can help with \
     product details, shipping, returns, and warranty questions. Could you try again with one \
     of the above topics?";

/// POST /api/ask - Answer a question with citations
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>> {
    let (query, k) = request.validate(state.config().retrieval.default_top_k)?;
    tracing::info!("Processing query: \"{}\" (k={})", query, k);

    let engine = state.engine();
    if engine.stats().total_chunks == 0 {
        tracing::warn!("Query before ingestion");
        return Ok(Json(AskResponse::guidance(query, NO_DOCS_ANSWER, 0.0)));
    }

    let contexts = engine.retrieve(&query, k).await?;
    if contexts.is_empty() {
        tracing::warn!("No context above relevance threshold (out of scope)");
        let retrieval_ms = engine.stats().avg_retrieval_latency_ms;
        return Ok(Json(AskResponse::guidance(query, OUT_OF_SCOPE_ANSWER, retrieval_ms)));
    }

    let answer = engine.generate(&query, &contexts).await?;

    let citations = contexts.iter().map(Citation::from_record).collect();
    let chunks = contexts.iter().map(ChunkView::from_record).collect();
    let stats = engine.stats();

    Ok(Json(AskResponse {
        query,
        answer,
        citations,
        chunks,
        metrics: AskMetrics {
            retrieval_ms: stats.avg_retrieval_latency_ms,
            generation_ms: stats.avg_generation_latency_ms,
        },
    }))
}
