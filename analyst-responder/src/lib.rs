pub mod llm;
pub mod responder;

// Re-export commonly used items from llm module
pub use llm::{
    AnalystPromptFormatter, GenerationParams, LlmClient, LlmConfig, LlmProvider, LlmResponse,
    MetricsTimer, RagMetrics, RagRetriever, TextGenerator,
};

// Re-export commonly used items from responder module
pub use responder::{
    create_embedder, create_generator, Answer, AnswerStrategy, EmbedderKind, LoadedCorpus,
    Responder, ResponderConfig, ResponderFactory,
};
