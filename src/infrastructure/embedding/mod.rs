//! Embedding provider implementations

mod factory;
mod gemini;
mod openai;

pub use factory::{EmbeddingProviderConfig, EmbeddingProviderFactory, EmbeddingProviderType};
pub use gemini::GeminiEmbeddingProvider;
pub use openai::OpenAiEmbeddingProvider;

pub use super::http_client::{HttpClient, HttpClientTrait};
