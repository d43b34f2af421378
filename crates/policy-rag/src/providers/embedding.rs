//! Embedding provider trait

use async_trait::async_trait;

use crate::error::Result;

/// Guard against division by zero when normalizing
const NORM_EPSILON: f32 = 1e-9;

/// Trait for converting text into fixed-dimension normalized vectors
///
/// Implementations acquire their underlying model lazily on first use and
/// report a capability-unavailable failure if it cannot be acquired.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text into a unit-norm vector of `dimensions()` floats
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embedding dimensions (384 for all-minilm)
    fn dimensions(&self) -> usize;

    /// Model identifier for reporting
    fn model_name(&self) -> &str;
}

/// Re-normalize a vector to unit L2 norm in place. The upstream model
/// usually normalizes already; this makes it a guarantee.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm + NORM_EPSILON;
    for x in vector.iter_mut() {
        *x /= denom;
    }
}
