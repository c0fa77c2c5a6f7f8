//! Completion provider implementations

mod factory;
mod gemini;
mod openai;

pub use factory::{CompletionProviderConfig, CompletionProviderFactory, CompletionProviderType};
pub use gemini::GeminiCompletionProvider;
pub use openai::OpenAiCompletionProvider;

pub use super::http_client::{HttpClient, HttpClientTrait};
