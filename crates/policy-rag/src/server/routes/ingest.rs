//! Corpus ingestion endpoint

use axum::{extract::State, Json};

use crate::error::Result;
use crate::ingestion::{build_chunks_from_docs, load_documents};
use crate::server::state::AppState;
use crate::types::IngestResponse;

/// POST /api/ingest - Load, chunk, and index the document corpus.
/// The store is cleared first so the index always reflects the current
/// corpus and embedding model.
pub async fn ingest(State(state): State<AppState>) -> Result<Json<IngestResponse>> {
    let corpus = &state.config().corpus;
    tracing::info!("Ingesting documents from {}", corpus.data_dir.display());

    let docs = load_documents(&corpus.data_dir)?;
    if docs.is_empty() {
        tracing::warn!("No documents found in {}", corpus.data_dir.display());
        return Ok(Json(IngestResponse {
            indexed_docs: 0,
            indexed_chunks: 0,
        }));
    }

    let chunks = build_chunks_from_docs(&docs, corpus.chunk_size, corpus.chunk_overlap);
    let (indexed_docs, indexed_chunks) = state.engine().ingest_chunks(&chunks, true).await?;

    tracing::info!("Ingested {} documents, {} chunks", indexed_docs, indexed_chunks);
    Ok(Json(IngestResponse {
        indexed_docs,
        indexed_chunks,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;

    use crate::config::RagConfig;
    use crate::engine::RagEngine;
    use crate::providers::memory::InMemoryStore;
    use crate::providers::stub::StubGenerator;
    use crate::test_support::BagOfWordsEmbedder;

    fn test_state(data_dir: std::path::PathBuf) -> AppState {
        let mut config = RagConfig::default();
        config.corpus.data_dir = data_dir;
        let engine = RagEngine::new(
            Arc::new(BagOfWordsEmbedder::new(384)),
            Arc::new(InMemoryStore::new()),
            Arc::new(StubGenerator::new()),
            config.retrieval.relevance_threshold,
        );
        AppState::with_engine(config, engine)
    }

    #[tokio::test]
    async fn ingest_indexes_corpus_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("returns.md"),
            "# Returns Policy\n\n## Refunds\n\nRefunds are granted within thirty days of purchase.\n",
        )
        .unwrap();

        let state = test_state(dir.path().to_path_buf());
        let response = ingest(State(state.clone())).await.unwrap();

        assert_eq!(response.0.indexed_docs, 1);
        assert!(response.0.indexed_chunks >= 1);
        assert_eq!(state.engine().stats().total_chunks, response.0.indexed_chunks);
    }

    #[tokio::test]
    async fn missing_corpus_dir_is_not_found() {
        let state = test_state(std::path::PathBuf::from("/nonexistent/corpus"));
        let err = ingest(State(state)).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::CorpusNotFound(_)));
    }

    #[tokio::test]
    async fn reingest_clears_and_reindexes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("shipping.txt"), "Orders ship within two business days.\n").unwrap();

        let state = test_state(dir.path().to_path_buf());
        ingest(State(state.clone())).await.unwrap();
        let response = ingest(State(state.clone())).await.unwrap();

        // clear-first means a re-run reindexes rather than deduping to zero
        assert_eq!(response.0.indexed_docs, 1);
        assert_eq!(state.engine().stats().total_chunks, response.0.indexed_chunks);
    }
}
