use analyst_core::{BusinessRecord, Dataset, Result};
use analyst_data_services::{
    BuildStats, CorpusBuilder, CorpusConfig, DatasetLoader, Embedder, FastEmbedder,
    HashingEmbedder, SentenceModel,
};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use super::analyst_responder::{AnswerStrategy, Responder, ResponderConfig};
use crate::llm::{LlmClient, LlmConfig, TextGenerator};

/// Which embedding backend to load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    /// Local sentence-embedding model via fastembed
    #[default]
    FastEmbed,
    /// Deterministic feature hashing, no model download
    Hashing,
}

/// Load the query/corpus embedder
pub fn create_embedder(kind: EmbedderKind, model: SentenceModel) -> Result<Arc<dyn Embedder>> {
    Ok(match kind {
        EmbedderKind::FastEmbed => Arc::new(FastEmbedder::new(model)?),
        EmbedderKind::Hashing => Arc::new(HashingEmbedder::new(model.dimension())),
    })
}

/// Create the text generator the strategy needs, if any
pub fn create_generator(
    strategy: AnswerStrategy,
    llm_config: LlmConfig,
    api_key: String,
) -> anyhow::Result<Option<Arc<dyn TextGenerator>>> {
    match strategy {
        AnswerStrategy::Extractive => Ok(None),
        AnswerStrategy::Generative => Ok(Some(Arc::new(LlmClient::new(llm_config, api_key)?))),
    }
}

/// A responder together with the records it was built from
pub struct LoadedCorpus {
    pub responder: Responder,
    pub records: Vec<BusinessRecord>,
    pub stats: BuildStats,
}

/// Builds complete responders from datasets
///
/// Holds the shared embedder and generator so every rebuilt index uses
/// the same models as the one it replaces.
#[derive(Clone)]
pub struct ResponderFactory {
    corpus_config: CorpusConfig,
    responder_config: ResponderConfig,
    embedder: Arc<dyn Embedder>,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl ResponderFactory {
    pub fn new(
        corpus_config: CorpusConfig,
        responder_config: ResponderConfig,
        embedder: Arc<dyn Embedder>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            corpus_config,
            responder_config,
            embedder,
            generator,
        }
    }

    pub fn responder_config(&self) -> &ResponderConfig {
        &self.responder_config
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Load a CSV file and build a responder over it
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<LoadedCorpus> {
        let dataset = DatasetLoader::from_path(path)?;
        self.load_dataset(&dataset)
    }

    /// Load CSV text from any reader, such as a request body
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<LoadedCorpus> {
        let dataset = DatasetLoader::from_reader(reader)?;
        self.load_dataset(&dataset)
    }

    /// Build a responder over an already loaded dataset
    pub fn load_dataset(&self, dataset: &Dataset) -> Result<LoadedCorpus> {
        let builder = CorpusBuilder::new(self.corpus_config.clone())?;
        let corpus = builder.build(dataset, self.embedder.as_ref())?;

        let responder = Responder::new(
            self.responder_config.clone(),
            Arc::new(corpus.index),
            Arc::clone(&self.embedder),
            self.generator.clone(),
        )?;

        Ok(LoadedCorpus {
            responder,
            records: corpus.records,
            stats: corpus.stats,
        })
    }
}
