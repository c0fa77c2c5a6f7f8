//! Chunking strategy trait and types

use std::collections::HashMap;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Configuration for chunking. Sizes are measured in characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Characters carried over from the end of one chunk into the next
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    /// Chunks shorter than this are dropped
    #[serde(default)]
    pub min_chunk_size: usize,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            min_chunk_size: 0,
        }
    }

    pub fn with_min_chunk_size(mut self, min_size: usize) -> Self {
        self.min_chunk_size = min_size;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.chunk_size == 0 {
            return Err(DomainError::validation("chunk_size must be greater than 0"));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(DomainError::validation(
                "chunk_overlap must be less than chunk_size",
            ));
        }

        if self.min_chunk_size > self.chunk_size {
            return Err(DomainError::validation(
                "min_chunk_size must be less than or equal to chunk_size",
            ));
        }

        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self::new(default_chunk_size(), default_chunk_overlap())
    }
}

/// Position of a chunk within its source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub chunk_index: usize,
    pub total_chunks: usize,
}

impl ChunkMetadata {
    pub fn new(chunk_index: usize, total_chunks: usize) -> Self {
        Self {
            chunk_index,
            total_chunks,
        }
    }

    pub fn to_json_map(&self) -> HashMap<String, serde_json::Value> {
        HashMap::from([
            ("chunk_index".to_string(), self.chunk_index.into()),
            ("total_chunks".to_string(), self.total_chunks.into()),
        ])
    }
}

/// A chunk of text extracted from a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub fn new(content: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    pub fn index(&self) -> usize {
        self.metadata.chunk_index
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Splits document text into chunks
pub trait ChunkingStrategy: Send + Sync + Debug {
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>, DomainError>;

    fn name(&self) -> &'static str;
}
