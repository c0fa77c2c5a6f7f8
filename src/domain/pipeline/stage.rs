//! Retrieval and generation stage contracts

use std::fmt::Debug;

use async_trait::async_trait;

use super::state::{Generation, Question, Retrieval};
use crate::domain::DomainError;

/// First stage: find grounding context for a question
#[async_trait]
pub trait Retriever: Send + Sync + Debug {
    async fn retrieve(&self, question: &Question) -> Result<Retrieval, DomainError>;
}

/// Second stage: answer a question from retrieved context only
#[async_trait]
pub trait Generator: Send + Sync + Debug {
    async fn generate(&self, question: &Question, context: &str)
        -> Result<Generation, DomainError>;
}
