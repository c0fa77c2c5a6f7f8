//! Domain layer - Core types, contracts, and pipeline state

pub mod completion;
pub mod embedding;
pub mod error;
pub mod ingestion;
pub mod pipeline;
pub mod vector_index;

pub use completion::{
    CompletionProvider, CompletionRequest, CompletionRequestBuilder, CompletionResponse,
    FinishReason, Message, MessageRole, Usage,
};
pub use embedding::{
    cosine_similarity, Embedding, EmbeddingInput, EmbeddingProvider, EmbeddingRequest,
    EmbeddingResponse, EmbeddingTask, TextEmbedder, TruncatingEmbedder,
};
pub use error::DomainError;
pub use ingestion::{
    Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy, IngestionConfig, IngestionReport,
};
pub use pipeline::{
    grounded_prompt, Generation, Generator, GeneratorConfig, PipelineError, PipelineStage,
    PipelineState, Question, Retrieval, Retriever, RetrieverConfig, DEFAULT_CONTEXT_SEPARATOR,
    GROUNDING_INSTRUCTION, REFUSAL_INSTRUCTION,
};
pub use vector_index::{IndexRecord, RetrievedPassage, VectorIndex, CONTENT_METADATA_KEY};

#[cfg(test)]
pub use completion::MockCompletionProvider;
#[cfg(test)]
pub use embedding::MockEmbeddingProvider;
#[cfg(test)]
pub use pipeline::{EchoGenerator, MockRetriever};
#[cfg(test)]
pub use vector_index::MockVectorIndex;
