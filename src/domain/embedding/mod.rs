//! Embedding provider domain models and traits

mod embedder;
mod provider;
mod request;
mod response;

pub use embedder::{TextEmbedder, TruncatingEmbedder};
pub use provider::EmbeddingProvider;
pub use request::{EmbeddingInput, EmbeddingRequest, EmbeddingTask};
pub use response::{cosine_similarity, Embedding, EmbeddingResponse};

#[cfg(test)]
pub use provider::mock::MockEmbeddingProvider;
