//! Embedding + similarity search retriever

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tokio::time::timeout;
use tracing::debug;

use crate::domain::{
    DomainError, Question, Retrieval, Retriever, RetrieverConfig, TextEmbedder, VectorIndex,
};

/// Retriever that embeds the question and queries a vector index
#[derive(Debug)]
pub struct VectorRetriever {
    embedder: Arc<dyn TextEmbedder>,
    index: Arc<dyn VectorIndex>,
    config: RetrieverConfig,
    timeout: Duration,
    index_dimension: OnceCell<Option<usize>>,
}

impl VectorRetriever {
    pub fn new(
        embedder: Arc<dyn TextEmbedder>,
        index: Arc<dyn VectorIndex>,
        config: RetrieverConfig,
    ) -> Self {
        let timeout = config.timeout();

        Self {
            embedder,
            index,
            config,
            timeout,
            index_dimension: OnceCell::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fail fast when stored vectors and query vectors cannot match
    pub async fn verify_index_dimension(&self) -> Result<(), DomainError> {
        match self.index_dimension().await? {
            Some(stored) if stored != self.embedder.dimensions() => {
                Err(DomainError::configuration(format!(
                    "index '{}' stores {}-dimensional vectors but the embedder produces {}",
                    self.index.index_name(),
                    stored,
                    self.embedder.dimensions()
                )))
            }
            _ => Ok(()),
        }
    }

    /// Stored vector dimension, fetched from the index once and cached
    async fn index_dimension(&self) -> Result<Option<usize>, DomainError> {
        self.index_dimension
            .get_or_try_init(|| self.index.dimension())
            .await
            .copied()
    }

    async fn search(&self, question: &Question) -> Result<Retrieval, DomainError> {
        let vector = self.embedder.embed(question.as_str()).await?;

        if let Some(stored) = self.index_dimension().await? {
            if vector.len() != stored {
                return Err(DomainError::vector_index(format!(
                    "query vector has {} dimensions, index '{}' stores {}",
                    vector.len(),
                    self.index.index_name(),
                    stored
                )));
            }
        }

        let passages = self.index.query(&vector, self.config.top_k).await?;

        debug!(
            index = self.index.index_name(),
            returned = passages.len(),
            "Similarity search complete"
        );

        Ok(Retrieval::from_passages(
            passages,
            self.config.top_k,
            &self.config.context_separator,
        ))
    }
}

#[async_trait]
impl Retriever for VectorRetriever {
    async fn retrieve(&self, question: &Question) -> Result<Retrieval, DomainError> {
        match timeout(self.timeout, self.search(question)).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::timeout(
                "retrieval",
                self.timeout.as_millis() as u64,
            )),
        }
    }
}
