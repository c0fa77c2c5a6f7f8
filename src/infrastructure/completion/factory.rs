use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{GeminiCompletionProvider, HttpClient, OpenAiCompletionProvider};
use crate::domain::{CompletionProvider, DomainError, GeneratorConfig};
use crate::infrastructure::credentials::env_api_key;

/// Supported completion backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionProviderType {
    Gemini,
    #[serde(alias = "openai")]
    OpenAi,
}

/// Completion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionProviderConfig {
    pub provider: CompletionProviderType,
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub base_url: Option<String>,
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for CompletionProviderConfig {
    fn default() -> Self {
        Self {
            provider: CompletionProviderType::Gemini,
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.0,
            max_tokens: None,
            base_url: None,
            api_key_env: "GOOGLE_API_KEY".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CompletionProviderConfig {
    /// Generation settings derived from this configuration
    pub fn generator_config(&self, timeout_secs: u64) -> GeneratorConfig {
        GeneratorConfig {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout_secs,
        }
    }
}

/// Factory for creating completion providers
#[derive(Debug)]
pub struct CompletionProviderFactory;

impl CompletionProviderFactory {
    /// Create a provider, reading the API key from the environment
    pub fn create(
        config: &CompletionProviderConfig,
    ) -> Result<Arc<dyn CompletionProvider>, DomainError> {
        let api_key = env_api_key(&config.api_key_env)?;
        Self::create_with_key(config, api_key)
    }

    pub fn create_with_key(
        config: &CompletionProviderConfig,
        api_key: impl Into<String>,
    ) -> Result<Arc<dyn CompletionProvider>, DomainError> {
        let http_client = HttpClient::with_timeout(Duration::from_secs(config.timeout_secs))?;

        let provider: Arc<dyn CompletionProvider> = match (config.provider, &config.base_url) {
            (CompletionProviderType::Gemini, Some(url)) => Arc::new(
                GeminiCompletionProvider::with_base_url(http_client, api_key, url),
            ),
            (CompletionProviderType::Gemini, None) => {
                Arc::new(GeminiCompletionProvider::new(http_client, api_key))
            }
            (CompletionProviderType::OpenAi, Some(url)) => Arc::new(
                OpenAiCompletionProvider::with_base_url(http_client, api_key, url),
            ),
            (CompletionProviderType::OpenAi, None) => {
                Arc::new(OpenAiCompletionProvider::new(http_client, api_key))
            }
        };

        Ok(provider)
    }
}
