//! Pipeline error types

use thiserror::Error;

use super::state::PipelineStage;
use crate::domain::DomainError;

/// Errors that abort a pipeline run
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Retrieval failed: {0}")]
    Retrieval(#[source] DomainError),

    #[error("Generation failed: {0}")]
    Generation(#[source] DomainError),

    #[error("Invalid pipeline transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: PipelineStage,
        to: PipelineStage,
    },
}

impl PipelineError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Underlying provider error, if any
    pub fn cause(&self) -> Option<&DomainError> {
        match self {
            Self::Retrieval(e) | Self::Generation(e) => Some(e),
            _ => None,
        }
    }

    /// Short label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Retrieval(_) => "retrieval",
            Self::Generation(_) => "generation",
            Self::InvalidTransition { .. } => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_error_display_and_source() {
        let error = PipelineError::Retrieval(DomainError::vector_index("unreachable"));

        assert_eq!(
            error.to_string(),
            "Retrieval failed: Vector index error: unreachable"
        );
        assert!(std::error::Error::source(&error).is_some());
        assert_eq!(error.kind(), "retrieval");
    }

    #[test]
    fn test_validation_has_no_cause() {
        let error = PipelineError::validation("question must not be empty");

        assert!(error.cause().is_none());
        assert_eq!(error.kind(), "validation");
    }
}
