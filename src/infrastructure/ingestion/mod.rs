//! Document ingestion infrastructure
//!
//! Chunking strategy implementations and the pipeline that writes chunks
//! into the vector index.

mod chunker;
mod pipeline;

pub use chunker::RecursiveChunker;
pub use pipeline::IngestionPipeline;
