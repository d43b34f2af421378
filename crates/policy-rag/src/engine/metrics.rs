//! Latency metrics accumulation

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// One latency observation
#[derive(Debug, Clone, Copy)]
pub struct MetricsSample {
    /// When the sample was taken
    pub at: DateTime<Utc>,
    /// Observed latency in milliseconds
    pub elapsed_ms: f64,
}

/// Running latency averages
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSummary {
    pub avg_retrieval_latency_ms: f64,
    pub avg_generation_latency_ms: f64,
}

/// Append-only recorder for retrieval and generation latency samples,
/// consumed only in aggregate
#[derive(Default)]
pub struct MetricsRecorder {
    retrieval: Mutex<Vec<MetricsSample>>,
    generation: Mutex<Vec<MetricsSample>>,
}

fn mean_ms(samples: &[MetricsSample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let total: f64 = samples.iter().map(|s| s.elapsed_ms).sum();
    round2(total / samples.len() as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl MetricsRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a retrieval latency sample
    pub fn record_retrieval(&self, elapsed_ms: f64) {
        self.retrieval.lock().push(MetricsSample {
            at: Utc::now(),
            elapsed_ms,
        });
    }

    /// Record a generation latency sample
    pub fn record_generation(&self, elapsed_ms: f64) {
        self.generation.lock().push(MetricsSample {
            at: Utc::now(),
            elapsed_ms,
        });
    }

    /// Running averages; 0.0 with no samples, never NaN
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            avg_retrieval_latency_ms: mean_ms(&self.retrieval.lock()),
            avg_generation_latency_ms: mean_ms(&self.generation.lock()),
        }
    }
}
