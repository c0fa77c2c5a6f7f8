//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use super::{EmbeddingRequest, EmbeddingResponse};
use crate::domain::DomainError;

/// Trait for raw embedding providers (Gemini, OpenAI, etc.)
///
/// Implementations return whatever dimensionality the model produces. Callers
/// that need vectors compatible with a fixed-size index go through
/// [`super::TruncatingEmbedder`].
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Generate embeddings for the given input
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
