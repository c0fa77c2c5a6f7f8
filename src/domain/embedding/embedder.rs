//! Fixed-dimension text embedding capability

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use super::{EmbeddingProvider, EmbeddingRequest, EmbeddingTask};
use crate::domain::DomainError;

/// Capability to turn text into vectors of one fixed dimensionality.
///
/// `embed` is the query-time path, `embed_batch` the ingestion-time path.
/// Both must yield vectors of `dimensions()` length so that queries and
/// stored passages live in the same space.
#[async_trait]
pub trait TextEmbedder: Send + Sync + Debug {
    /// Embed a single question
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    /// Embed a batch of documents, preserving input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError>;

    /// Length of every vector this embedder returns
    fn dimensions(&self) -> usize;
}

/// Decorator that truncates a provider's vectors to a fixed length.
///
/// The same instance (same model, same truncation) backs both ingestion and
/// querying.
#[derive(Debug, Clone)]
pub struct TruncatingEmbedder {
    provider: Arc<dyn EmbeddingProvider>,
    model: String,
    dimensions: usize,
}

impl TruncatingEmbedder {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        model: impl Into<String>,
        dimensions: usize,
    ) -> Result<Self, DomainError> {
        if dimensions == 0 {
            return Err(DomainError::configuration(
                "embedding dimensions must be greater than 0",
            ));
        }

        Ok(Self {
            provider,
            model: model.into(),
            dimensions,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn truncate(&self, mut vector: Vec<f32>) -> Result<Vec<f32>, DomainError> {
        if vector.len() < self.dimensions {
            return Err(DomainError::provider(
                self.provider.provider_name(),
                format!(
                    "embedding has {} dimensions, expected at least {}",
                    vector.len(),
                    self.dimensions
                ),
            ));
        }

        vector.truncate(self.dimensions);
        Ok(vector)
    }

    async fn embed_texts(
        &self,
        texts: Vec<String>,
        task: EmbeddingTask,
    ) -> Result<Vec<Vec<f32>>, DomainError> {
        let expected = texts.len();
        let request = EmbeddingRequest::batch(self.model.clone(), texts).with_task(task);
        let vectors = self.provider.embed(request).await?.into_vectors();

        if vectors.len() != expected {
            return Err(DomainError::provider(
                self.provider.provider_name(),
                format!("expected {} embeddings, got {}", expected, vectors.len()),
            ));
        }

        vectors.into_iter().map(|v| self.truncate(v)).collect()
    }
}

#[async_trait]
impl TextEmbedder for TruncatingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let mut vectors = self
            .embed_texts(vec![text.to_string()], EmbeddingTask::RetrievalQuery)
            .await?;

        vectors.pop().ok_or_else(|| {
            DomainError::provider(self.provider.provider_name(), "no embedding returned")
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        self.embed_texts(texts.to_vec(), EmbeddingTask::RetrievalDocument)
            .await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
