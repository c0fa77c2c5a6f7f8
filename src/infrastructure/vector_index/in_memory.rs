//! In-memory cosine index for development and testing

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::embedding::cosine_similarity;
use crate::domain::vector_index::{IndexRecord, RetrievedPassage, VectorIndex};
use crate::domain::DomainError;

/// Brute-force cosine similarity index held in process memory
#[derive(Debug, Clone)]
pub struct InMemoryVectorIndex {
    name: String,
    dimension: Option<usize>,
    records: Arc<RwLock<Vec<IndexRecord>>>,
}

impl InMemoryVectorIndex {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dimension: None,
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Fix the vector dimension; mismatched upserts and queries are rejected
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    async fn effective_dimension(&self) -> Option<usize> {
        match self.dimension {
            Some(dims) => Some(dims),
            None => self.records.read().await.first().map(|r| r.dimensions()),
        }
    }

    fn check_dimension(expected: Option<usize>, actual: usize) -> Result<(), DomainError> {
        match expected {
            Some(dims) if dims != actual => Err(DomainError::vector_index(format!(
                "vector has {} dimensions, index expects {}",
                actual, dims
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    fn index_name(&self) -> &str {
        &self.name
    }

    fn provider_type(&self) -> &'static str {
        "in_memory"
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedPassage>, DomainError> {
        Self::check_dimension(self.effective_dimension().await, vector.len())?;

        let records = self.records.read().await;

        let mut scored: Vec<RetrievedPassage> = records
            .iter()
            .map(|r| {
                RetrievedPassage::new(&r.id, &r.content, cosine_similarity(vector, &r.values))
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);

        Ok(scored)
    }

    async fn upsert(&self, records: Vec<IndexRecord>) -> Result<usize, DomainError> {
        let mut stored = self.records.write().await;

        let expected = self
            .dimension
            .or_else(|| stored.first().map(|r| r.dimensions()))
            .or_else(|| records.first().map(|r| r.dimensions()));

        for record in &records {
            Self::check_dimension(expected, record.dimensions())?;
        }

        let count = records.len();

        for record in records {
            match stored.iter_mut().find(|existing| existing.id == record.id) {
                Some(existing) => *existing = record,
                None => stored.push(record),
            }
        }

        Ok(count)
    }

    async fn dimension(&self) -> Result<Option<usize>, DomainError> {
        Ok(self.effective_dimension().await)
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        Ok(true)
    }
}
