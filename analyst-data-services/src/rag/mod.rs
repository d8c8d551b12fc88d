pub mod chunker;
pub mod corpus_builder;
pub mod corpus_index;
pub mod dataset_loader;
pub mod embedder;
pub mod record_formatter;

// Re-export commonly used items
pub use chunker::{reassemble, Chunk, ChunkingConfig, TextChunker};
pub use corpus_builder::{BuildStats, BuiltCorpus, CorpusBuilder, CorpusConfig};
pub use corpus_index::{cosine_similarity, CorpusIndex, IndexedChunk, ScoredChunk};
pub use dataset_loader::DatasetLoader;
pub use embedder::{Embedder, FastEmbedder, HashingEmbedder, SentenceModel};
pub use record_formatter::{
    assemble_documents, documents_from_records, Document, DocumentGranularity, RecordFormatter,
};
