//! Overlapping text chunker
//!
//! Splits a document into windows of at most `chunk_size` characters. Each
//! chunk after the first starts `chunk_overlap` characters before the end of
//! its predecessor, so no content is dropped and neighbouring chunks share
//! context. Sizes are counted in `char`s, never bytes.

use analyst_core::{AnalystError, Result};
use serde::{Deserialize, Serialize};

/// Chunking configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum characters per chunk
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,
    /// Preferred cut point; a chunk ends right after it when possible
    pub separator: char,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            separator: '\n',
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(AnalystError::InvalidConfig(
                "chunk_size must be > 0".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(AnalystError::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// A bounded slice of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    /// Document this chunk was cut from
    pub document_index: usize,
    /// Chunk position within its document
    pub chunk_index: usize,
    /// Start offset in the document (chars)
    pub start: usize,
    /// End offset in the document (chars, exclusive)
    pub end: usize,
    /// Leading characters shared with the previous chunk of the same document
    pub overlap: usize,
}

/// Splits documents into overlapping chunks
#[derive(Debug, Clone)]
pub struct TextChunker {
    config: ChunkingConfig,
}

impl TextChunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Chunk one document. Text within `chunk_size` comes back as a single chunk.
    pub fn chunk(&self, document_index: usize, text: &str) -> Vec<Chunk> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let n = chars.len();
        let byte_at = |i: usize| if i == n { text.len() } else { chars[i].0 };

        if n <= self.config.chunk_size {
            return vec![Chunk {
                text: text.to_string(),
                document_index,
                chunk_index: 0,
                start: 0,
                end: n,
                overlap: 0,
            }];
        }

        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;
        let mut chunks = Vec::new();
        let mut start = 0;
        let mut prev_end = 0;

        loop {
            let hard_end = (start + size).min(n);
            let end = if hard_end == n {
                n
            } else {
                // Latest separator past the overlap region; guarantees forward progress
                let min_end = start + overlap + 1;
                (min_end..=hard_end)
                    .rev()
                    .find(|&e| chars[e - 1].1 == self.config.separator)
                    .unwrap_or(hard_end)
            };

            chunks.push(Chunk {
                text: text[byte_at(start)..byte_at(end)].to_string(),
                document_index,
                chunk_index: chunks.len(),
                start,
                end,
                overlap: if chunks.is_empty() { 0 } else { prev_end - start },
            });

            if end == n {
                break;
            }
            prev_end = end;
            start = end - overlap;
        }

        tracing::debug!(
            "Split document {} ({} chars) into {} chunks",
            document_index,
            n,
            chunks.len()
        );

        chunks
    }
}

/// Rebuild document text from its chunks by dropping each chunk's overlap
pub fn reassemble(chunks: &[Chunk]) -> String {
    let mut text = String::new();
    for chunk in chunks {
        text.extend(chunk.text.chars().skip(chunk.overlap));
    }
    text
}
