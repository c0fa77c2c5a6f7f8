use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{GeminiEmbeddingProvider, HttpClient, OpenAiEmbeddingProvider};
use crate::domain::{DomainError, EmbeddingProvider, TextEmbedder, TruncatingEmbedder};
use crate::infrastructure::credentials::env_api_key;

/// Supported embedding backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProviderType {
    Gemini,
    #[serde(alias = "openai")]
    OpenAi,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingProviderConfig {
    pub provider: EmbeddingProviderType,
    pub model: String,
    /// Length every vector is truncated to; must match the index dimension
    pub dimensions: usize,
    #[serde(default)]
    pub base_url: Option<String>,
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for EmbeddingProviderConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderType::Gemini,
            model: "models/text-embedding-004".to_string(),
            dimensions: 512,
            base_url: None,
            api_key_env: "GOOGLE_API_KEY".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Factory for creating embedding providers
#[derive(Debug)]
pub struct EmbeddingProviderFactory;

impl EmbeddingProviderFactory {
    /// Create a raw provider, reading the API key from the environment
    pub fn create(
        config: &EmbeddingProviderConfig,
    ) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
        let api_key = env_api_key(&config.api_key_env)?;
        Self::create_with_key(config, api_key)
    }

    pub fn create_with_key(
        config: &EmbeddingProviderConfig,
        api_key: impl Into<String>,
    ) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
        let http_client =
            HttpClient::with_timeout(std::time::Duration::from_secs(config.timeout_secs))?;

        let provider: Arc<dyn EmbeddingProvider> = match (config.provider, &config.base_url) {
            (EmbeddingProviderType::Gemini, Some(url)) => Arc::new(
                GeminiEmbeddingProvider::with_base_url(http_client, api_key, url),
            ),
            (EmbeddingProviderType::Gemini, None) => {
                Arc::new(GeminiEmbeddingProvider::new(http_client, api_key))
            }
            (EmbeddingProviderType::OpenAi, Some(url)) => Arc::new(
                OpenAiEmbeddingProvider::with_base_url(http_client, api_key, url),
            ),
            (EmbeddingProviderType::OpenAi, None) => {
                Arc::new(OpenAiEmbeddingProvider::new(http_client, api_key))
            }
        };

        Ok(provider)
    }

    /// Wrap a provider in the truncating embedder shared by ingestion and retrieval
    pub fn create_embedder(
        config: &EmbeddingProviderConfig,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Arc<dyn TextEmbedder>, DomainError> {
        let embedder = TruncatingEmbedder::new(provider, config.model.clone(), config.dimensions)?;
        Ok(Arc::new(embedder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EmbeddingProviderConfig::default();

        assert_eq!(config.provider, EmbeddingProviderType::Gemini);
        assert_eq!(config.model, "models/text-embedding-004");
        assert_eq!(config.dimensions, 512);
        assert_eq!(config.api_key_env, "GOOGLE_API_KEY");
    }

    #[test]
    fn test_create_each_provider() {
        let mut config = EmbeddingProviderConfig::default();
        let gemini = EmbeddingProviderFactory::create_with_key(&config, "key").unwrap();
        assert_eq!(gemini.provider_name(), "gemini");

        config.provider = EmbeddingProviderType::OpenAi;
        config.base_url = Some("http://localhost:8080".to_string());
        let openai = EmbeddingProviderFactory::create_with_key(&config, "key").unwrap();
        assert_eq!(openai.provider_name(), "openai");
    }

    #[test]
    fn test_create_embedder_uses_configured_dimensions() {
        let config = EmbeddingProviderConfig::default();
        let provider = EmbeddingProviderFactory::create_with_key(&config, "key").unwrap();

        let embedder = EmbeddingProviderFactory::create_embedder(&config, provider).unwrap();

        assert_eq!(embedder.dimensions(), 512);
    }

    #[test]
    fn test_provider_type_deserialize() {
        let parsed: EmbeddingProviderType = serde_json::from_str("\"openai\"").unwrap();
        assert_eq!(parsed, EmbeddingProviderType::OpenAi);
    }
}
