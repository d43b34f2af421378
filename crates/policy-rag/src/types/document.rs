//! Document, chunk, and stored-record types

use serde::{Deserialize, Serialize};

/// A source document produced by the corpus loader.
/// Immutable; input to chunking only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document title
    pub title: String,
    /// Section heading, if the document is split into sections
    pub section: Option<String>,
    /// Full section text
    pub text: String,
}

/// A bounded slice of a document's text, the atomic unit of retrieval.
/// Identity is not inherent; it is derived from the content hash at
/// ingestion time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Title of the source document
    pub title: String,
    /// Section heading, if any
    pub section: Option<String>,
    /// Chunk text
    pub text: String,
}

/// A record held by the vector store, keyed by content hash.
/// Created on upsert, never updated in place, destroyed on clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Numeric store identifier derived from the content hash,
    /// within [0, 2^63 - 1)
    pub id: u64,
    /// Content hash of the chunk text, the deduplication key
    pub hash: String,
    /// Title of the source document
    pub title: String,
    /// Section heading, if any
    #[serde(default)]
    pub section: Option<String>,
    /// Chunk text
    pub text: String,
}

/// A search hit: a stored record with its cosine similarity to the query.
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    /// Cosine similarity to the query vector, higher is more similar
    pub similarity: f32,
    /// The matched record
    pub record: StoredRecord,
}
