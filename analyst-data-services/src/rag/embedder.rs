use analyst_core::{AnalystError, Result};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use serde::{Deserialize, Serialize};

/// Shared embedding service.
///
/// The same instance must embed the corpus and every query; vectors from
/// different models are not comparable.
pub trait Embedder: Send + Sync {
    /// Identifier of the underlying model
    fn model_name(&self) -> &str;

    /// Length of every vector this embedder produces
    fn dimension(&self) -> usize;

    /// Embed a batch of texts, one vector per input, in input order
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text
    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| AnalystError::Embedding("Failed to generate embedding".to_string()))
    }
}

/// Sentence-embedding models available through fastembed (both 384 dimensions)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SentenceModel {
    #[default]
    AllMiniLmL6V2,
    BgeSmallEnV15,
}

impl SentenceModel {
    pub fn name(&self) -> &'static str {
        match self {
            SentenceModel::AllMiniLmL6V2 => "all-MiniLM-L6-v2",
            SentenceModel::BgeSmallEnV15 => "bge-small-en-v1.5",
        }
    }

    pub fn dimension(&self) -> usize {
        384
    }

    fn fastembed_model(&self) -> EmbeddingModel {
        match self {
            SentenceModel::AllMiniLmL6V2 => EmbeddingModel::AllMiniLML6V2,
            SentenceModel::BgeSmallEnV15 => EmbeddingModel::BGESmallENV15,
        }
    }
}

/// ONNX sentence embedder backed by fastembed
pub struct FastEmbedder {
    model: TextEmbedding,
    kind: SentenceModel,
}

impl FastEmbedder {
    /// Load the model (downloads it on first run)
    pub fn new(kind: SentenceModel) -> Result<Self> {
        tracing::info!("Loading embedding model ({})...", kind.name());

        let model = TextEmbedding::try_new(
            InitOptions::new(kind.fastembed_model()).with_show_download_progress(true),
        )
        .map_err(|e| AnalystError::Embedding(format!("failed to load {}: {}", kind.name(), e)))?;

        tracing::info!("Embedding model {} ready", kind.name());

        Ok(Self { model, kind })
    }
}

impl Embedder for FastEmbedder {
    fn model_name(&self) -> &str {
        self.kind.name()
    }

    fn dimension(&self) -> usize {
        self.kind.dimension()
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.model
            .embed(texts.to_vec(), None)
            .map_err(|e| AnalystError::Embedding(e.to_string()))
    }
}

/// Deterministic feature-hashing embedder.
///
/// Lowercased alphanumeric tokens are hashed (FNV-1a) into `dimension`
/// buckets with a sign bit, then L2-normalised. Needs no model files, so it
/// serves offline deployments and tests.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
    name: String,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            name: format!("feature-hashing-{}", dimension),
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        if self.dimension == 0 {
            return vector;
        }

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(token.to_lowercase().as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl Embedder for HashingEmbedder {
    fn model_name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    bytes.iter().fold(OFFSET, |hash, &b| (hash ^ b as u64).wrapping_mul(PRIME))
}
