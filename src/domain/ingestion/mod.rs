//! Document ingestion domain types
//!
//! Documents are split by a [`ChunkingStrategy`], embedded, and written to
//! the vector index as one record per chunk.

pub mod chunker;
pub mod pipeline;

pub use chunker::{Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy};
pub use pipeline::{IngestionConfig, IngestionReport};
