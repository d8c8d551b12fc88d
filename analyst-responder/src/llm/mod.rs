pub mod llm_client;
pub mod metrics;
pub mod prompt_formatter;
pub mod rag_retriever;

// Re-export commonly used items
pub use llm_client::{
    GenerationParams, LlmClient, LlmConfig, LlmProvider, LlmResponse, TextGenerator,
};
pub use metrics::{MetricsTimer, RagMetrics};
pub use prompt_formatter::AnalystPromptFormatter;
pub use rag_retriever::RagRetriever;
