//! Question answering request and response types

use serde::{Deserialize, Serialize};

use crate::domain::PipelineState;

/// `POST /ask` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// `POST /ask` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    /// Cosine similarity of the best passage, 0.0 when nothing matched
    pub similarity: f32,
    /// Same value as `similarity`; kept for older clients
    pub confidence: f32,
    pub context: String,
    pub passages_used: usize,
    /// `similarity` reached the configured relevance threshold
    pub relevant: bool,
}

impl AskResponse {
    pub fn from_state(state: &PipelineState, relevance_threshold: f32) -> Self {
        Self {
            answer: state.answer().unwrap_or_default().to_string(),
            similarity: state.score(),
            confidence: state.score(),
            context: state.context().to_string(),
            passages_used: state.passages_used(),
            relevant: state.is_relevant(relevance_threshold),
        }
    }
}
