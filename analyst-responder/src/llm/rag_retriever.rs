use analyst_core::Result;
use analyst_data_services::{CorpusIndex, Embedder, ScoredChunk};
use std::sync::Arc;

use super::metrics::{MetricsTimer, RagMetrics};

/// Retrieves the chunks most similar to a query from a built corpus index
#[derive(Clone)]
pub struct RagRetriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<CorpusIndex>,
}

impl RagRetriever {
    /// The embedder must be the one the index was built with
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<CorpusIndex>) -> Self {
        if embedder.model_name() != index.embedding_model() {
            tracing::warn!(
                "Query embedder '{}' differs from corpus embedder '{}'; similarity scores may be meaningless",
                embedder.model_name(),
                index.embedding_model()
            );
        }

        Self { embedder, index }
    }

    pub fn index(&self) -> &CorpusIndex {
        &self.index
    }

    /// Embed the query and return the `top_k` best chunks with timing metrics
    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<(Vec<ScoredChunk>, RagMetrics)> {
        let mut metrics = RagMetrics::new();

        tracing::debug!("Retrieving context: query={:?}, top_k={}", query, top_k);

        let timer = MetricsTimer::start();
        let query_embedding = self.embedder.embed_one(query)?;
        metrics.set_embedding_latency(timer.stop());

        let timer = MetricsTimer::start();
        let matches = self.index.rank(&query_embedding, top_k)?;
        metrics.set_retrieval_latency(timer.stop());

        metrics.set_similarity_scores(matches.iter().map(|m| m.similarity).collect());

        tracing::debug!(
            "Retrieved {} of {} chunks (best similarity {:?})",
            matches.len(),
            self.index.len(),
            metrics.similarity_max
        );

        Ok((matches, metrics))
    }
}
