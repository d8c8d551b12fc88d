pub mod rag;

// Re-export commonly used items
pub use rag::{
    BuildStats, BuiltCorpus, Chunk, ChunkingConfig, CorpusBuilder, CorpusConfig, CorpusIndex,
    DatasetLoader, DocumentGranularity, Embedder, FastEmbedder, HashingEmbedder, RecordFormatter,
    ScoredChunk, SentenceModel,
};
