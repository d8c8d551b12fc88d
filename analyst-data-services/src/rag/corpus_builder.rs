use analyst_core::{BusinessRecord, Dataset, DatasetSchema, Result};
use serde::{Deserialize, Serialize};

use super::chunker::{Chunk, ChunkingConfig, TextChunker};
use super::corpus_index::CorpusIndex;
use super::embedder::Embedder;
use super::record_formatter::{assemble_documents, DocumentGranularity};

/// Corpus construction settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub schema: DatasetSchema,
    pub granularity: DocumentGranularity,
    pub chunking: ChunkingConfig,
}

/// Statistics from a corpus build
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct BuildStats {
    pub records: usize,
    pub documents: usize,
    pub chunks: usize,
    pub embeddings: usize,
}

/// Output of a full build: the typed records plus the embedded index
#[derive(Debug, Clone)]
pub struct BuiltCorpus {
    pub records: Vec<BusinessRecord>,
    pub index: CorpusIndex,
    pub stats: BuildStats,
}

/// Corpus builder that:
/// 1. Resolves dataset rows into records
/// 2. Renders records into documents
/// 3. Splits long documents into overlapping chunks
/// 4. Embeds the chunks into a `CorpusIndex`
pub struct CorpusBuilder {
    config: CorpusConfig,
    chunker: TextChunker,
}

impl CorpusBuilder {
    pub fn new(config: CorpusConfig) -> Result<Self> {
        let chunker = TextChunker::new(config.chunking.clone())?;

        tracing::info!(
            "Corpus builder: granularity={:?}, chunk_size={}, chunk_overlap={}",
            config.granularity,
            config.chunking.chunk_size,
            config.chunking.chunk_overlap
        );

        Ok(Self { config, chunker })
    }

    pub fn config(&self) -> &CorpusConfig {
        &self.config
    }

    /// Produce the ordered chunk sequence for a dataset (documents in row order,
    /// chunks in document order)
    pub fn build_chunks(&self, dataset: &Dataset) -> Result<(Vec<BusinessRecord>, Vec<Chunk>)> {
        let (records, documents) =
            assemble_documents(dataset, &self.config.schema, self.config.granularity)?;

        let chunks: Vec<Chunk> = documents
            .iter()
            .flat_map(|doc| self.chunker.chunk(doc.index, &doc.text))
            .collect();

        tracing::info!(
            "Assembled {} records into {} documents and {} chunks",
            records.len(),
            documents.len(),
            chunks.len()
        );

        Ok((records, chunks))
    }

    /// Build the embedded corpus index from scratch
    pub fn build(&self, dataset: &Dataset, embedder: &dyn Embedder) -> Result<BuiltCorpus> {
        let (records, chunks) = self.build_chunks(dataset)?;

        let documents = match self.config.granularity {
            DocumentGranularity::PerRow => records.len(),
            DocumentGranularity::WholeDataset => 1,
        };
        let chunk_count = chunks.len();

        let index = CorpusIndex::build(chunks, embedder)?;

        let stats = BuildStats {
            records: records.len(),
            documents,
            chunks: chunk_count,
            embeddings: index.len(),
        };

        tracing::info!("Corpus build complete: {:?}", stats);

        Ok(BuiltCorpus {
            records,
            index,
            stats,
        })
    }
}
