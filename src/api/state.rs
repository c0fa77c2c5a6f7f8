//! Application state shared by request handlers

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{PipelineError, PipelineState, VectorIndex};
use crate::infrastructure::pipeline::RagPipeline;

/// Application state; cloned per request, services are shared
#[derive(Clone)]
pub struct AppState {
    pub answer_service: Arc<dyn AnswerService>,
    /// Checked by the readiness probe
    pub index: Arc<dyn VectorIndex>,
    pub relevance_threshold: f32,
}

impl AppState {
    pub fn new(answer_service: Arc<dyn AnswerService>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            answer_service,
            index,
            relevance_threshold: 0.5,
        }
    }

    pub fn with_relevance_threshold(mut self, threshold: f32) -> Self {
        self.relevance_threshold = threshold;
        self
    }
}

/// Trait for answering questions end to end
#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn answer(&self, question: &str) -> Result<PipelineState, PipelineError>;
}

#[async_trait]
impl AnswerService for RagPipeline {
    async fn answer(&self, question: &str) -> Result<PipelineState, PipelineError> {
        self.run(question).await
    }
}
