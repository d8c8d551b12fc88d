use analyst_core::BusinessSummary;
use analyst_responder::{LoadedCorpus, ResponderFactory};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::error::RpcError;
use crate::protocol::*;

/// Handler for analyst queries
///
/// The loaded corpus is published behind an `Arc`. Queries clone the `Arc`
/// and run against that snapshot; a reload builds the replacement fully
/// before swapping it in, so in-flight queries finish on the old index.
pub struct AnalystQueryHandler {
    factory: ResponderFactory,
    current: RwLock<Arc<LoadedCorpus>>,
}

impl AnalystQueryHandler {
    pub fn new(factory: ResponderFactory, initial: LoadedCorpus) -> Self {
        Self {
            factory,
            current: RwLock::new(Arc::new(initial)),
        }
    }

    async fn snapshot(&self) -> Arc<LoadedCorpus> {
        Arc::clone(&*self.current.read().await)
    }

    /// Handle an analyst.ask request
    pub async fn handle_ask(&self, params: AskRequest) -> Result<AskResponse, RpcError> {
        let query_start = Instant::now();
        let loaded = self.snapshot().await;
        let responder = &loaded.responder;
        let top_k = params.top_k.unwrap_or(responder.config().top_k);

        tracing::debug!("Handling ask: query={:?}, top_k={}", params.query, top_k);

        let answer = responder.answer_with_k(&params.query, top_k).await?;

        let matches = answer
            .matches
            .iter()
            .enumerate()
            .map(|(i, m)| MatchJson {
                rank: i + 1,
                similarity: m.similarity,
                text: m.chunk.text.clone(),
                document_index: m.chunk.document_index,
                chunk_index: m.chunk.chunk_index,
            })
            .collect();

        let trend = answer.show_trend_chart.then(|| {
            loaded
                .records
                .iter()
                .map(|r| TrendPoint {
                    period: r.period.clone(),
                    sales: r.sales,
                    expenses: r.expenses,
                    profit: r.profit(),
                })
                .collect()
        });

        let query_duration = query_start.elapsed().as_millis() as u64;

        tracing::info!(
            "Ask completed: strategy={}, matches={}, duration={}ms",
            answer.strategy.as_str(),
            answer.matches.len(),
            query_duration
        );

        Ok(AskResponse {
            answer: answer.text,
            strategy: answer.strategy.as_str().to_string(),
            matches,
            show_trend_chart: answer.show_trend_chart,
            trend,
            metadata: Metadata {
                query_duration_ms: query_duration,
                embedding_duration_ms: answer.metrics.embedding_latency_ms,
                retrieval_duration_ms: answer.metrics.retrieval_latency_ms,
                generation_duration_ms: answer.metrics.generation_latency_ms,
                corpus_size: responder.index().len(),
                embedding_model: responder.index().embedding_model().to_string(),
            },
        })
    }

    /// Handle an analyst.summary request
    pub async fn handle_summary(&self) -> Result<SummaryResponse, RpcError> {
        let loaded = self.snapshot().await;
        let summary = BusinessSummary::from_records(&loaded.records)?;

        Ok(SummaryResponse {
            overview: summary.overview(),
            periods: summary.periods,
            avg_sales: summary.avg_sales,
            avg_expenses: summary.avg_expenses,
            avg_profit: summary.avg_profit,
            avg_roi_pct: summary.avg_roi_pct,
            best_period: summary.best_period,
            best_profit: summary.best_profit,
        })
    }

    /// Handle an analyst.reload request
    ///
    /// On failure the current corpus stays published.
    pub async fn handle_reload(&self, params: ReloadRequest) -> Result<ReloadResponse, RpcError> {
        let source = params.into_source()?;
        let factory = self.factory.clone();

        match &source {
            ReloadSource::Path(path) => tracing::info!("Rebuilding corpus from {}", path),
            ReloadSource::Inline(csv) => {
                tracing::info!("Rebuilding corpus from {} bytes of inline CSV", csv.len())
            }
        }

        // Embedding the corpus is CPU-bound
        let loaded = tokio::task::spawn_blocking(move || match source {
            ReloadSource::Path(path) => factory.load_path(path),
            ReloadSource::Inline(csv) => factory.load_reader(csv.as_bytes()),
        })
        .await
        .map_err(|e| RpcError::InternalError(format!("reload task failed: {}", e)))??;

        let index = loaded.responder.index();
        let response = ReloadResponse {
            records: loaded.stats.records,
            chunks: loaded.stats.chunks,
            embedding_model: index.embedding_model().to_string(),
            indexed_at: index.built_at().to_rfc3339(),
        };

        *self.current.write().await = Arc::new(loaded);

        tracing::info!(
            "Corpus swapped: {} records, {} chunks",
            response.records,
            response.chunks
        );

        Ok(response)
    }
}
