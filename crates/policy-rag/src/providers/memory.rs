//! In-memory vector store with linear-scan cosine search
//!
//! O(N*d) per search, which is fine at the hundreds-to-low-thousands of
//! chunks this service holds. Requires no external dependency, and doubles
//! as the fallback when Qdrant is unreachable.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::Result;
use crate::types::{ScoredRecord, StoredRecord};

use super::vector_store::VectorStore;

const EPSILON: f32 = 1e-9;

#[derive(Default)]
struct Inner {
    vectors: Vec<Vec<f32>>,
    records: Vec<StoredRecord>,
    hashes: HashSet<String>,
}

/// Process-local vector store. The writer lock serializes `clear` and
/// `upsert` against concurrent searches, so readers never observe a
/// partially cleared store.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cosine_similarity(a: &[f32], b: &[f32], b_norm: f32) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let a_norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    dot / (a_norm * b_norm + EPSILON)
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn upsert(&self, vectors: Vec<Vec<f32>>, records: Vec<StoredRecord>) -> Result<()> {
        let mut inner = self.inner.write();
        for (vector, record) in vectors.into_iter().zip(records.into_iter()) {
            if inner.hashes.contains(&record.hash) {
                continue;
            }
            inner.hashes.insert(record.hash.clone());
            inner.vectors.push(vector);
            inner.records.push(record);
        }
        Ok(())
    }

    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredRecord>> {
        let inner = self.inner.read();
        if inner.vectors.is_empty() {
            return Ok(Vec::new());
        }

        let query_norm: f32 = query.iter().map(|x| x * x).sum::<f32>().sqrt() + EPSILON;
        let mut hits: Vec<ScoredRecord> = inner
            .vectors
            .iter()
            .zip(inner.records.iter())
            .map(|(vector, record)| ScoredRecord {
                similarity: cosine_similarity(vector, query, query_norm),
                record: record.clone(),
            })
            .collect();

        hits.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap());
        hits.truncate(k);
        Ok(hits)
    }

    async fn clear(&self) -> Result<()> {
        let mut inner = self.inner.write();
        inner.vectors.clear();
        inner.records.clear();
        inner.hashes.clear();
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::{doc_hash, point_id};

    fn record(text: &str, title: &str) -> StoredRecord {
        let hash = doc_hash(text);
        StoredRecord {
            id: point_id(&hash),
            hash,
            title: title.to_string(),
            section: None,
            text: text.to_string(),
        }
    }

    fn unit(mut v: Vec<f32>) -> Vec<f32> {
        crate::providers::embedding::l2_normalize(&mut v);
        v
    }

    #[tokio::test]
    async fn empty_store_returns_no_results() {
        let store = InMemoryStore::new();
        let hits = store.search(&[1.0, 0.0, 0.0], 4).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn self_retrieval_returns_own_record_first() {
        let store = InMemoryStore::new();
        let vectors = vec![
            unit(vec![1.0, 0.0, 0.0]),
            unit(vec![0.0, 1.0, 0.0]),
            unit(vec![0.0, 0.0, 1.0]),
        ];
        let records = vec![record("a", "A"), record("b", "B"), record("c", "C")];
        store.upsert(vectors.clone(), records).await.unwrap();

        for (vector, title) in vectors.iter().zip(["A", "B", "C"]) {
            let hits = store.search(vector, 1).await.unwrap();
            assert_eq!(hits[0].record.title, title);
            assert!(hits[0].similarity > 0.99);
        }
    }

    #[tokio::test]
    async fn results_are_ordered_by_similarity() {
        let store = InMemoryStore::new();
        let vectors = vec![unit(vec![1.0, 0.0]), unit(vec![1.0, 1.0]), unit(vec![0.0, 1.0])];
        let records = vec![record("x", "X"), record("xy", "XY"), record("y", "Y")];
        store.upsert(vectors, records).await.unwrap();

        let hits = store.search(&unit(vec![1.0, 0.0]), 3).await.unwrap();
        assert_eq!(hits[0].record.title, "X");
        assert_eq!(hits[1].record.title, "XY");
        assert_eq!(hits[2].record.title, "Y");
        assert!(hits[0].similarity >= hits[1].similarity);
        assert!(hits[1].similarity >= hits[2].similarity);
    }

    #[tokio::test]
    async fn duplicate_hashes_are_skipped() {
        let store = InMemoryStore::new();
        let vectors = vec![unit(vec![1.0, 0.0]); 2];
        let records = vec![record("same text", "A"), record("same text", "B")];
        store.upsert(vectors, records).await.unwrap();
        assert_eq!(store.len(), 1);

        // re-ingesting identical content is a no-op on the record count
        store
            .upsert(vec![unit(vec![1.0, 0.0])], vec![record("same text", "C")])
            .await
            .unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let store = InMemoryStore::new();
        store.clear().await.unwrap();
        store
            .upsert(vec![unit(vec![1.0, 0.0])], vec![record("a", "A")])
            .await
            .unwrap();
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(store.is_empty());
    }
}
