//! Completion provider domain models and traits

mod message;
mod provider;
mod request;
mod response;

pub use message::{Message, MessageRole};
pub use provider::CompletionProvider;
pub use request::{CompletionRequest, CompletionRequestBuilder};
pub use response::{CompletionResponse, FinishReason, Usage};

#[cfg(test)]
pub use provider::mock::MockCompletionProvider;
