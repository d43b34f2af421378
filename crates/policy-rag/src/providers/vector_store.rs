//! Vector store provider trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ScoredRecord, StoredRecord};

/// Trait for vector storage and cosine-similarity search
///
/// Implementations:
/// - `InMemoryStore`: linear-scan cosine over process memory
/// - `QdrantStore`: external Qdrant collection over REST
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert vectors paired positionally with their records. Records whose
    /// content hash is already present are skipped, so re-ingesting
    /// identical content is idempotent.
    async fn upsert(&self, vectors: Vec<Vec<f32>>, records: Vec<StoredRecord>) -> Result<()>;

    /// Return up to `k` records ordered by descending cosine similarity.
    /// An empty store yields an empty result, not an error.
    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredRecord>>;

    /// Remove all records. Safe to call on an empty or never-initialized
    /// store.
    async fn clear(&self) -> Result<()>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
