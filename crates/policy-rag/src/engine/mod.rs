//! The RAG orchestrator: ingestion pipeline, query pipeline, and stats

pub mod metrics;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::config::RagConfig;
use crate::error::Result;
use crate::ingestion::{doc_hash, point_id};
use crate::providers::{Embedder, Generator, VectorStore};
use crate::types::{Chunk, StoredRecord};

pub use metrics::{MetricsRecorder, MetricsSummary};

/// Corpus counters, updated by ingestion and reset by clearing the store
#[derive(Default)]
struct CorpusState {
    titles: HashSet<String>,
    chunk_count: usize,
    seen_hashes: HashSet<String>,
}

/// Aggregate engine statistics
#[derive(Debug, Clone)]
pub struct EngineStats {
    pub total_docs: usize,
    pub total_chunks: usize,
    pub embedding_model: String,
    pub llm_model: String,
    pub avg_retrieval_latency_ms: f64,
    pub avg_generation_latency_ms: f64,
}

/// Orchestrates embedding, storage, retrieval, and generation. One engine
/// is constructed per process and injected into request handlers; tests
/// build their own with whatever providers they need.
pub struct RagEngine {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    generator: Arc<dyn Generator>,
    metrics: MetricsRecorder,
    corpus: Mutex<CorpusState>,
    relevance_threshold: f32,
}

impl RagEngine {
    /// Create an engine from explicit providers
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        generator: Arc<dyn Generator>,
        relevance_threshold: f32,
    ) -> Self {
        Self {
            embedder,
            store,
            generator,
            metrics: MetricsRecorder::new(),
            corpus: Mutex::new(CorpusState::default()),
            relevance_threshold,
        }
    }

    /// Build an engine from configuration, selecting the store and
    /// generator backends (with the Qdrant-to-memory fallback)
    pub async fn from_config(config: &RagConfig) -> Self {
        let embedder = crate::providers::build_embedder(config);
        let store = crate::providers::select_vector_store(config).await;
        let generator = crate::providers::select_generator(config);
        tracing::info!(
            "Engine ready (store: {}, embedder: {}, generator: {})",
            store.name(),
            embedder.model_name(),
            generator.model_name()
        );
        Self::new(embedder, store, generator, config.retrieval.relevance_threshold)
    }

    /// Drop all stored records and reset the corpus counters.
    /// Metrics history survives a clear.
    pub async fn clear_store(&self) -> Result<()> {
        self.store.clear().await?;
        let mut corpus = self.corpus.lock();
        corpus.titles.clear();
        corpus.chunk_count = 0;
        corpus.seen_hashes.clear();
        Ok(())
    }

    /// Ingest chunks: hash, dedupe, embed, and upsert in one batch.
    /// Returns (newly seen titles, chunks actually indexed). Chunks whose
    /// content hash was already ingested are skipped and not counted, so
    /// the counters track genuinely new records.
    pub async fn ingest_chunks(&self, chunks: &[Chunk], clear_first: bool) -> Result<(usize, usize)> {
        if clear_first {
            self.clear_store().await?;
        }

        // Stage unseen chunks without holding the lock across embedding
        let fresh: Vec<(&Chunk, String)> = {
            let corpus = self.corpus.lock();
            let mut staged: HashSet<String> = HashSet::new();
            chunks
                .iter()
                .filter_map(|chunk| {
                    let hash = doc_hash(&chunk.text);
                    if corpus.seen_hashes.contains(&hash) || !staged.insert(hash.clone()) {
                        None
                    } else {
                        Some((chunk, hash))
                    }
                })
                .collect()
        };

        let mut vectors = Vec::with_capacity(fresh.len());
        let mut records = Vec::with_capacity(fresh.len());
        for (chunk, hash) in &fresh {
            let vector = self.embedder.embed(&chunk.text).await?;
            vectors.push(vector);
            records.push(StoredRecord {
                id: point_id(hash),
                hash: hash.clone(),
                title: chunk.title.clone(),
                section: chunk.section.clone(),
                text: chunk.text.clone(),
            });
        }

        self.store.upsert(vectors, records).await?;

        let mut corpus = self.corpus.lock();
        let titles_before = corpus.titles.len();
        for (chunk, hash) in fresh.iter() {
            corpus.titles.insert(chunk.title.clone());
            corpus.seen_hashes.insert(hash.clone());
        }
        corpus.chunk_count += fresh.len();
        let new_titles = corpus.titles.len() - titles_before;

        tracing::info!(
            "Ingested {} chunks ({} skipped as duplicates), {} new titles",
            fresh.len(),
            chunks.len() - fresh.len(),
            new_titles
        );
        Ok((new_titles, fresh.len()))
    }

    /// Embed the query, search the store, and drop everything at or below
    /// the relevance threshold. An empty result means the query is out of
    /// scope for the corpus.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<StoredRecord>> {
        let start = Instant::now();
        let query_vector = self.embedder.embed(query).await?;
        let hits = self.store.search(&query_vector, k).await?;
        self.metrics
            .record_retrieval(start.elapsed().as_secs_f64() * 1000.0);

        let candidates = hits.len();
        let contexts: Vec<StoredRecord> = hits
            .into_iter()
            .filter(|hit| hit.similarity > self.relevance_threshold)
            .map(|hit| hit.record)
            .collect();

        tracing::debug!(
            "Retrieved {} of {} candidates above threshold {}",
            contexts.len(),
            candidates,
            self.relevance_threshold
        );
        Ok(contexts)
    }

    /// Generate an answer from the retrieved contexts, recording latency
    pub async fn generate(&self, query: &str, contexts: &[StoredRecord]) -> Result<String> {
        let start = Instant::now();
        let answer = self.generator.generate(query, contexts).await?;
        self.metrics
            .record_generation(start.elapsed().as_secs_f64() * 1000.0);
        Ok(answer)
    }

    /// Aggregate statistics; averages are 0.0 until the first sample
    pub fn stats(&self) -> EngineStats {
        let summary = self.metrics.summary();
        let corpus = self.corpus.lock();
        EngineStats {
            total_docs: corpus.titles.len(),
            total_chunks: corpus.chunk_count,
            embedding_model: self.embedder.model_name().to_string(),
            llm_model: self.generator.model_name().to_string(),
            avg_retrieval_latency_ms: summary.avg_retrieval_latency_ms,
            avg_generation_latency_ms: summary.avg_generation_latency_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::memory::InMemoryStore;
    use crate::providers::stub::StubGenerator;
    use crate::test_support::BagOfWordsEmbedder;

    fn chunk(title: &str, section: Option<&str>, text: &str) -> Chunk {
        Chunk {
            title: title.to_string(),
            section: section.map(str::to_string),
            text: text.to_string(),
        }
    }

    fn engine() -> RagEngine {
        RagEngine::new(
            Arc::new(BagOfWordsEmbedder::new(384)),
            Arc::new(InMemoryStore::new()),
            Arc::new(StubGenerator::new()),
            0.35,
        )
    }

    #[tokio::test]
    async fn fresh_engine_stats_are_zeroed() {
        let engine = engine();
        let stats = engine.stats();
        assert_eq!(stats.total_docs, 0);
        assert_eq!(stats.total_chunks, 0);
        assert_eq!(stats.avg_retrieval_latency_ms, 0.0);
        assert_eq!(stats.avg_generation_latency_ms, 0.0);
    }

    #[tokio::test]
    async fn ingest_counts_titles_and_chunks() {
        let engine = engine();
        let chunks = vec![
            chunk("Returns Policy", Some("Refunds"), "refunds are granted within thirty days"),
            chunk("Returns Policy", Some("Exchanges"), "exchanges are possible within sixty days"),
            chunk("Returns Policy", None, "contact support to start a return"),
        ];

        let (docs, indexed) = engine.ingest_chunks(&chunks, false).await.unwrap();
        assert_eq!(docs, 1);
        assert_eq!(indexed, 3);
        assert_eq!(engine.stats().total_chunks, 3);
    }

    #[tokio::test]
    async fn reingesting_identical_chunks_is_not_counted() {
        let engine = engine();
        let chunks = vec![chunk("Shipping", None, "orders ship within two business days")];

        engine.ingest_chunks(&chunks, false).await.unwrap();
        let (docs, indexed) = engine.ingest_chunks(&chunks, false).await.unwrap();
        assert_eq!(docs, 0);
        assert_eq!(indexed, 0);
        assert_eq!(engine.stats().total_chunks, 1);
    }

    #[tokio::test]
    async fn clear_first_resets_counters_but_keeps_metrics() {
        let engine = engine();
        let chunks = vec![chunk("Warranty", None, "one year limited warranty coverage")];
        engine.ingest_chunks(&chunks, false).await.unwrap();
        engine.retrieve("warranty coverage", 4).await.unwrap();
        assert!(engine.stats().avg_retrieval_latency_ms >= 0.0);

        let (docs, indexed) = engine.ingest_chunks(&chunks, true).await.unwrap();
        assert_eq!((docs, indexed), (1, 1));
        assert_eq!(engine.stats().total_chunks, 1);
    }

    #[tokio::test]
    async fn retrieve_finds_matching_chunk() {
        let engine = engine();
        let chunks = vec![
            chunk("Returns Policy", Some("Refunds"), "refunds are granted within thirty days"),
            chunk("Shipping", None, "orders ship within two business days"),
        ];
        engine.ingest_chunks(&chunks, false).await.unwrap();

        let contexts = engine
            .retrieve("refunds are granted within thirty days", 4)
            .await
            .unwrap();
        assert!(!contexts.is_empty());
        assert_eq!(contexts[0].title, "Returns Policy");
    }

    #[tokio::test]
    async fn retrieve_filters_out_of_scope_queries() {
        let engine = engine();
        let chunks = vec![chunk("Returns Policy", None, "refunds are granted within thirty days")];
        engine.ingest_chunks(&chunks, false).await.unwrap();

        let contexts = engine.retrieve("qwzx gibberish", 4).await.unwrap();
        assert!(contexts.is_empty());
    }

    #[tokio::test]
    async fn generate_records_latency() {
        let engine = engine();
        let contexts = vec![StoredRecord {
            id: 1,
            hash: "h".to_string(),
            title: "Returns Policy".to_string(),
            section: None,
            text: "refunds within thirty days".to_string(),
        }];

        let answer = engine.generate("refund window?", &contexts).await.unwrap();
        assert!(answer.contains("Returns Policy"));
        assert!(engine.stats().avg_generation_latency_ms >= 0.0);
    }
}
