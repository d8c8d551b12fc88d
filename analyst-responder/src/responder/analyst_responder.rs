use analyst_core::{wants_trend_chart, AnalystError, Result};
use analyst_data_services::{CorpusIndex, Embedder, ScoredChunk};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::llm::{
    AnalystPromptFormatter, GenerationParams, MetricsTimer, RagMetrics, RagRetriever,
    TextGenerator,
};

/// How the final answer text is produced from the retrieved context
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerStrategy {
    /// List the matched records with their similarity, no model involved
    #[default]
    Extractive,
    /// Ask a text-generation service to answer from the retrieved context
    Generative,
}

impl AnswerStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerStrategy::Extractive => "extractive",
            AnswerStrategy::Generative => "generative",
        }
    }
}

/// Configuration for the responder
#[derive(Debug, Clone)]
pub struct ResponderConfig {
    /// Number of chunks retrieved per query
    pub top_k: usize,

    pub strategy: AnswerStrategy,

    /// Sampling parameters for the Generative strategy
    pub generation: GenerationParams,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            strategy: AnswerStrategy::Extractive,
            generation: GenerationParams::default(),
        }
    }
}

/// Answer to a single query
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub strategy: AnswerStrategy,

    /// Retrieved chunks, best first
    pub matches: Vec<ScoredChunk>,

    /// Whether the query asks for a trend or comparison view
    pub show_trend_chart: bool,

    pub metrics: RagMetrics,
}

/// Retrieval-augmented responder
///
/// Answers free-text questions about the loaded dataset by:
///
/// 1. Embedding the query with the same embedder that built the corpus
/// 2. Ranking corpus chunks by cosine similarity
/// 3. Assembling the top-k chunks into a context window
/// 4. Producing the answer with the configured strategy
///
/// Answering never mutates the index. A new dataset means a new `Responder`
/// over a freshly built index, published as a whole.
pub struct Responder {
    config: ResponderConfig,
    retriever: RagRetriever,
    index: Arc<CorpusIndex>,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl Responder {
    /// Create a new responder
    ///
    /// # Arguments
    /// * `config` - Responder configuration
    /// * `index` - Built corpus index
    /// * `embedder` - Query embedder, the one `index` was built with
    /// * `generator` - Text-generation service, required for the Generative strategy
    pub fn new(
        config: ResponderConfig,
        index: Arc<CorpusIndex>,
        embedder: Arc<dyn Embedder>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Result<Self> {
        if config.top_k == 0 {
            return Err(AnalystError::InvalidConfig(
                "top_k must be at least 1".to_string(),
            ));
        }
        if config.strategy == AnswerStrategy::Generative && generator.is_none() {
            return Err(AnalystError::InvalidConfig(
                "generative strategy requires a text generator".to_string(),
            ));
        }

        tracing::info!(
            "Initializing responder: strategy={}, top_k={}, corpus_size={}, embedding_model={}",
            config.strategy.as_str(),
            config.top_k,
            index.len(),
            index.embedding_model()
        );

        let retriever = RagRetriever::new(embedder, Arc::clone(&index));

        Ok(Self {
            config,
            retriever,
            index,
            generator,
        })
    }

    pub fn config(&self) -> &ResponderConfig {
        &self.config
    }

    pub fn index(&self) -> &Arc<CorpusIndex> {
        &self.index
    }

    /// Answer a query with the configured `top_k`
    pub async fn answer(&self, query: &str) -> Result<Answer> {
        self.answer_with_k(query, self.config.top_k).await
    }

    /// Answer a query, returning only the text
    pub async fn answer_text(&self, query: &str) -> Result<String> {
        Ok(self.answer(query).await?.text)
    }

    /// Answer a query retrieving `top_k` chunks
    ///
    /// `top_k` larger than the corpus returns every chunk. Errors from
    /// embedding, ranking or generation are returned unchanged.
    pub async fn answer_with_k(&self, query: &str, top_k: usize) -> Result<Answer> {
        if top_k == 0 {
            return Err(AnalystError::InvalidConfig(
                "top_k must be at least 1".to_string(),
            ));
        }

        // Query embedding is model inference; keep it off the async workers
        let retriever = self.retriever.clone();
        let owned_query = query.to_string();
        let (matches, mut metrics) =
            tokio::task::spawn_blocking(move || retriever.retrieve(&owned_query, top_k))
                .await
                .map_err(|e| {
                    AnalystError::Embedding(format!("query embedding task failed: {}", e))
                })??;

        let text = match self.config.strategy {
            AnswerStrategy::Extractive => {
                AnalystPromptFormatter::format_extractive(query, &matches)
            }
            AnswerStrategy::Generative => {
                let timer = MetricsTimer::start();
                let text = self.generate(query, &matches).await?;
                metrics.set_generation_latency(timer.stop());
                text
            }
        };

        metrics.report();

        Ok(Answer {
            text,
            strategy: self.config.strategy,
            matches,
            show_trend_chart: wants_trend_chart(query),
            metrics,
        })
    }

    async fn generate(&self, query: &str, matches: &[ScoredChunk]) -> Result<String> {
        let generator = self.generator.as_ref().ok_or_else(|| {
            AnalystError::GenerationUnavailable("no text generator configured".to_string())
        })?;

        let context = AnalystPromptFormatter::assemble_context(matches);
        let prompt = AnalystPromptFormatter::format_generative(query, &context);

        tracing::debug!(
            "Generating answer: prompt_length={} chars, context_chunks={}",
            prompt.len(),
            matches.len()
        );

        let raw = generator.generate(&prompt, &self.config.generation).await?;
        let answer = AnalystPromptFormatter::strip_prompt_echo(&raw, &prompt);

        if answer.is_empty() {
            return Err(AnalystError::GenerationUnavailable(
                "generation service returned no continuation".to_string(),
            ));
        }

        Ok(answer)
    }
}
