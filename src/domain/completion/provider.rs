use async_trait::async_trait;
use std::fmt::Debug;

use super::{CompletionRequest, CompletionResponse};
use crate::domain::DomainError;

/// Trait for text completion providers (Gemini, OpenAI, etc.)
#[async_trait]
pub trait CompletionProvider: Send + Sync + Debug {
    /// Send a completion request to the given model
    async fn complete(
        &self,
        model: &str,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
