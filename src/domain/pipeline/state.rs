//! Pipeline state and its transitions

use serde::Serialize;

use super::error::PipelineError;
use crate::domain::vector_index::RetrievedPassage;

/// A validated, non-empty question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Question(String);

impl Question {
    /// Validate and wrap a question; whitespace-only input is rejected
    pub fn parse(text: impl Into<String>) -> Result<Self, PipelineError> {
        let text = text.into();

        if text.trim().is_empty() {
            return Err(PipelineError::validation("question must not be empty"));
        }

        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Retrieving,
    Generating,
    Done,
}

/// Output of the retrieval stage
#[derive(Debug, Clone, PartialEq)]
pub struct Retrieval {
    pub context: String,
    /// Similarity of the top-ranked passage, 0.0 when nothing matched
    pub score: f32,
    pub passages: Vec<RetrievedPassage>,
}

impl Retrieval {
    /// Retrieval that found nothing
    pub fn empty() -> Self {
        Self {
            context: String::new(),
            score: 0.0,
            passages: Vec::new(),
        }
    }

    /// Keep the first `top_k` passages and join their contents.
    ///
    /// `passages` must already be ranked best-first by the index.
    pub fn from_passages(
        mut passages: Vec<RetrievedPassage>,
        top_k: usize,
        separator: &str,
    ) -> Self {
        passages.truncate(top_k);

        let Some(best) = passages.first() else {
            return Self::empty();
        };

        let score = best.score;
        let context = passages
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join(separator);

        Self {
            context,
            score,
            passages,
        }
    }
}

/// Output of the generation stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub answer: String,
}

impl Generation {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
        }
    }
}

/// The record threaded through one pipeline run.
///
/// Created per question, moved through `with_retrieval` then
/// `with_generation`, and handed back to the caller once `Done`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineState {
    question: Question,
    context: String,
    score: f32,
    passages_used: usize,
    answer: Option<String>,
    stage: PipelineStage,
}

impl PipelineState {
    pub fn new(question: Question) -> Self {
        Self {
            question,
            context: String::new(),
            score: 0.0,
            passages_used: 0,
            answer: None,
            stage: PipelineStage::Retrieving,
        }
    }

    /// Retrieving -> Generating
    pub fn with_retrieval(self, retrieval: Retrieval) -> Result<Self, PipelineError> {
        self.expect_stage(PipelineStage::Retrieving, PipelineStage::Generating)?;

        Ok(Self {
            context: retrieval.context,
            score: retrieval.score,
            passages_used: retrieval.passages.len(),
            stage: PipelineStage::Generating,
            ..self
        })
    }

    /// Generating -> Done
    pub fn with_generation(self, generation: Generation) -> Result<Self, PipelineError> {
        self.expect_stage(PipelineStage::Generating, PipelineStage::Done)?;

        Ok(Self {
            answer: Some(generation.answer),
            stage: PipelineStage::Done,
            ..self
        })
    }

    fn expect_stage(&self, from: PipelineStage, to: PipelineStage) -> Result<(), PipelineError> {
        if self.stage != from {
            return Err(PipelineError::InvalidTransition {
                from: self.stage,
                to,
            });
        }
        Ok(())
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// Cosine similarity of the best passage (not a calibrated probability)
    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn passages_used(&self) -> usize {
        self.passages_used
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Whether the best passage clears `threshold`
    pub fn is_relevant(&self, threshold: f32) -> bool {
        self.passages_used > 0 && self.score >= threshold
    }
}
