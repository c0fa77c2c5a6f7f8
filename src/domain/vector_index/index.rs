//! Vector index provider trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::record::{IndexRecord, RetrievedPassage};
use crate::domain::DomainError;

/// Similarity-search index over passage embeddings
///
/// Implementations handle the specific backend (Pinecone, in-memory) and
/// return passages ranked best-first.
#[async_trait]
pub trait VectorIndex: Send + Sync + Debug {
    /// Name of the index this provider is bound to
    fn index_name(&self) -> &str;

    /// Provider type name
    fn provider_type(&self) -> &'static str;

    /// Return up to `top_k` passages closest to `vector`, best match first
    async fn query(&self, vector: &[f32], top_k: usize)
        -> Result<Vec<RetrievedPassage>, DomainError>;

    /// Insert or replace records, returning how many were written
    async fn upsert(&self, records: Vec<IndexRecord>) -> Result<usize, DomainError>;

    /// Dimensionality of stored vectors, if the index reports one
    async fn dimension(&self) -> Result<Option<usize>, DomainError>;

    /// Check if the index is reachable
    async fn health_check(&self) -> Result<bool, DomainError>;
}
