//! Ingestion configuration and results

use serde::{Deserialize, Serialize};

use super::chunker::ChunkingConfig;
use crate::domain::DomainError;

/// Configuration for document ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    #[serde(flatten)]
    pub chunking: ChunkingConfig,
    /// Chunks embedded and upserted per request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    100
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            batch_size: default_batch_size(),
        }
    }
}

impl IngestionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.chunking = chunking;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.chunking.validate()?;

        if self.batch_size == 0 {
            return Err(DomainError::validation("batch_size must be greater than 0"));
        }

        Ok(())
    }
}

/// Outcome of ingesting one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    pub source: String,
    pub chunks: usize,
    pub upserted: usize,
    pub batches: usize,
}

impl IngestionReport {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            chunks: 0,
            upserted: 0,
            batches: 0,
        }
    }
}
