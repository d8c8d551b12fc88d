//! Per-query metrics for the RAG responder
//!
//! Tracks:
//! - Query embedding latency
//! - Ranking latency over the corpus index
//! - Generation latency (Generative strategy only)
//! - Similarity of the retrieved chunks

use serde::Serialize;
use std::time::{Duration, Instant};

/// Metrics for one answered query
#[derive(Debug, Clone, Default, Serialize)]
pub struct RagMetrics {
    /// Time taken to embed the query (milliseconds)
    pub embedding_latency_ms: u64,

    /// Time taken to rank the corpus (milliseconds)
    pub retrieval_latency_ms: u64,

    /// Time taken by the generation service (milliseconds)
    pub generation_latency_ms: u64,

    /// Similarity scores for all retrieved chunks, best first
    pub similarity_scores: Vec<f32>,

    pub similarity_min: Option<f32>,
    pub similarity_max: Option<f32>,

    /// Number of chunks retrieved
    pub num_matches: usize,
}

impl RagMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_embedding_latency(&mut self, duration: Duration) {
        self.embedding_latency_ms = duration.as_millis() as u64;
    }

    pub fn set_retrieval_latency(&mut self, duration: Duration) {
        self.retrieval_latency_ms = duration.as_millis() as u64;
    }

    pub fn set_generation_latency(&mut self, duration: Duration) {
        self.generation_latency_ms = duration.as_millis() as u64;
    }

    /// Record similarity scores and compute their range
    pub fn set_similarity_scores(&mut self, scores: Vec<f32>) {
        self.similarity_min = scores.iter().copied().reduce(f32::min);
        self.similarity_max = scores.iter().copied().reduce(f32::max);
        self.num_matches = scores.len();
        self.similarity_scores = scores;
    }

    pub fn avg_similarity(&self) -> f32 {
        if self.similarity_scores.is_empty() {
            0.0
        } else {
            self.similarity_scores.iter().sum::<f32>() / self.similarity_scores.len() as f32
        }
    }

    /// Embedding + retrieval + generation
    pub fn total_latency_ms(&self) -> u64 {
        self.embedding_latency_ms + self.retrieval_latency_ms + self.generation_latency_ms
    }

    /// Report metrics to tracing logs
    pub fn report(&self) {
        tracing::info!(
            "RAG Metrics: embedding={}ms, retrieval={}ms, generation={}ms, total={}ms, avg_sim={:.3}, matches={}, sim_range=[{:?},{:?}]",
            self.embedding_latency_ms,
            self.retrieval_latency_ms,
            self.generation_latency_ms,
            self.total_latency_ms(),
            self.avg_similarity(),
            self.num_matches,
            self.similarity_min,
            self.similarity_max,
        );
    }
}

/// Timer helper for measuring operation latency
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Stop the timer and return elapsed duration
    pub fn stop(self) -> Duration {
        self.start.elapsed()
    }
}
