//! Deterministic providers for tests

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use crate::error::Result;
use crate::providers::embedding::{l2_normalize, Embedder};

/// Deterministic feature-hashing embedder: each lowercased whitespace token
/// is hashed into a bucket. Identical text maps to identical vectors, and
/// texts with disjoint vocabulary are (near-)orthogonal, which is all the
/// retrieval tests need.
pub struct BagOfWordsEmbedder {
    dimensions: usize,
}

impl BagOfWordsEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn bucket(&self, token: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        (hasher.finish() as usize) % self.dimensions
    }
}

#[async_trait]
impl Embedder for BagOfWordsEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text.split_whitespace() {
            vector[self.bucket(&token.to_lowercase())] += 1.0;
        }
        l2_normalize(&mut vector);
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        "bag-of-words"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embeddings_are_unit_norm_and_deterministic() {
        let embedder = BagOfWordsEmbedder::new(384);
        let a = embedder.embed("refund window thirty days").await.unwrap();
        let b = embedder.embed("refund window thirty days").await.unwrap();

        assert_eq!(a.len(), 384);
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }
}
