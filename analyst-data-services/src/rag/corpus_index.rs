use analyst_core::{AnalystError, Result};
use chrono::{DateTime, Utc};

use super::chunker::Chunk;
use super::embedder::Embedder;

/// Embedding batch size used while building the index
const BATCH_SIZE: usize = 100;

/// A chunk together with its embedding
#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// A chunk returned by ranking, with its cosine similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    /// Position of the chunk in the index
    pub position: usize,
    pub similarity: f32,
    pub chunk: Chunk,
}

/// In-memory corpus of embedded chunks.
///
/// Built once, then only read. Ranking is a full cosine scan, which is
/// plenty for datasets of a few hundred rows.
#[derive(Debug, Clone)]
pub struct CorpusIndex {
    entries: Vec<IndexedChunk>,
    dimension: usize,
    embedding_model: String,
    built_at: DateTime<Utc>,
}

impl CorpusIndex {
    /// Embed every chunk and build the index. Refuses to build over zero chunks.
    pub fn build(chunks: Vec<Chunk>, embedder: &dyn Embedder) -> Result<Self> {
        if chunks.is_empty() {
            return Err(AnalystError::EmptyCorpus);
        }

        tracing::info!(
            "Building corpus index: {} chunks, model={}",
            chunks.len(),
            embedder.model_name()
        );

        let mut embeddings = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = embedder.embed(&texts)?;

            if vectors.len() != texts.len() {
                return Err(AnalystError::Embedding(format!(
                    "embedder returned {} vectors for {} texts",
                    vectors.len(),
                    texts.len()
                )));
            }

            tracing::debug!("Embedded batch of {} chunks", vectors.len());
            embeddings.extend(vectors);
        }

        let entries: Vec<IndexedChunk> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
            .collect();

        Self::from_entries(entries, embedder.model_name())
    }

    /// Assemble an index from precomputed embeddings
    pub fn from_entries(entries: Vec<IndexedChunk>, embedding_model: &str) -> Result<Self> {
        let dimension = entries
            .first()
            .map(|e| e.embedding.len())
            .ok_or(AnalystError::EmptyCorpus)?;

        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != dimension) {
            return Err(AnalystError::DimensionMismatch {
                expected: dimension,
                actual: bad.embedding.len(),
            });
        }

        tracing::info!(
            "Corpus index ready: {} entries, {} dimensions",
            entries.len(),
            dimension
        );

        Ok(Self {
            entries,
            dimension,
            embedding_model: embedding_model.to_string(),
            built_at: Utc::now(),
        })
    }

    /// Rank chunks by cosine similarity to the query embedding.
    ///
    /// Returns at most `top_k` chunks, highest similarity first, ties in index
    /// order. The query dimension is checked before any similarity is computed.
    pub fn rank(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>> {
        if query_embedding.len() != self.dimension {
            return Err(AnalystError::DimensionMismatch {
                expected: self.dimension,
                actual: query_embedding.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, cosine_similarity(query_embedding, &e.embedding)))
            .collect();

        // sort_by is stable: equal scores keep index order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(position, similarity)| ScoredChunk {
                position,
                similarity,
                chunk: self.entries[position].chunk.clone(),
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}

/// Cosine similarity between two vectors of equal length; 0.0 for zero vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(i: usize) -> Chunk {
        Chunk {
            text: format!("chunk {}", i),
            document_index: i,
            chunk_index: 0,
            start: 0,
            end: 7,
            overlap: 0,
        }
    }

    fn index(vectors: Vec<Vec<f32>>) -> CorpusIndex {
        let entries = vectors
            .into_iter()
            .enumerate()
            .map(|(i, embedding)| IndexedChunk {
                chunk: chunk(i),
                embedding,
            })
            .collect();
        CorpusIndex::from_entries(entries, "test").unwrap()
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_rank_orders_by_similarity() {
        let idx = index(vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ]);

        let ranked = idx.rank(&[1.0, 0.1], 2).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].position, 1);
        assert_eq!(ranked[1].position, 2);
        assert!(ranked[0].similarity >= ranked[1].similarity);
    }

    #[test]
    fn test_rank_ties_keep_index_order() {
        let idx = index(vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 0.0],
        ]);

        let ranked = idx.rank(&[1.0, 0.0], 3).unwrap();
        let positions: Vec<usize> = ranked.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 2, 3]);
    }

    #[test]
    fn test_rank_fewer_than_k() {
        let idx = index(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        let ranked = idx.rank(&[1.0, 0.0], 5).unwrap();
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_rank_dimension_mismatch() {
        let idx = index(vec![vec![0.5; 512]]);
        let err = idx.rank(&vec![0.5; 384], 3).unwrap_err();
        assert_eq!(
            err,
            AnalystError::DimensionMismatch {
                expected: 512,
                actual: 384
            }
        );
    }

    #[test]
    fn test_empty_and_ragged_entries() {
        assert_eq!(
            CorpusIndex::from_entries(vec![], "test").unwrap_err(),
            AnalystError::EmptyCorpus
        );

        let ragged = vec![
            IndexedChunk {
                chunk: chunk(0),
                embedding: vec![1.0, 0.0],
            },
            IndexedChunk {
                chunk: chunk(1),
                embedding: vec![1.0],
            },
        ];
        assert!(matches!(
            CorpusIndex::from_entries(ragged, "test"),
            Err(AnalystError::DimensionMismatch { .. })
        ));
    }
}
