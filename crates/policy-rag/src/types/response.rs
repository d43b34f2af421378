//! Response types for the HTTP API

use serde::{Deserialize, Serialize};

use super::document::StoredRecord;

/// Result of a corpus ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Number of newly seen document titles
    pub indexed_docs: usize,
    /// Number of chunks indexed in this run
    pub indexed_chunks: usize,
}

/// A source citation attached to an answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl Citation {
    /// Build a citation from a retrieved record
    pub fn from_record(record: &StoredRecord) -> Self {
        Self {
            title: record.title.clone(),
            section: record.section.clone(),
        }
    }
}

/// A retrieved chunk as returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkView {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub text: String,
}

impl ChunkView {
    /// Build a chunk view from a retrieved record
    pub fn from_record(record: &StoredRecord) -> Self {
        Self {
            title: record.title.clone(),
            section: record.section.clone(),
            text: record.text.clone(),
        }
    }
}

/// Latency metrics attached to an answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskMetrics {
    pub retrieval_ms: f64,
    pub generation_ms: f64,
}

/// Answer with citations and supporting chunks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub query: String,
    pub answer: String,
    pub citations: Vec<Citation>,
    pub chunks: Vec<ChunkView>,
    pub metrics: AskMetrics,
}

impl AskResponse {
    /// A successful response that carries a guidance message instead of a
    /// retrieved answer (nothing ingested, or nothing above the relevance
    /// threshold). Deliberately not an error.
    pub fn guidance(query: String, answer: &str, retrieval_ms: f64) -> Self {
        Self {
            query,
            answer: answer.to_string(),
            citations: Vec::new(),
            chunks: Vec::new(),
            metrics: AskMetrics {
                retrieval_ms,
                generation_ms: 0.0,
            },
        }
    }
}

/// Aggregate service metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub total_docs: usize,
    pub total_chunks: usize,
    pub avg_retrieval_latency_ms: f64,
    pub avg_generation_latency_ms: f64,
    pub embedding_model: String,
    pub llm_model: String,
}
