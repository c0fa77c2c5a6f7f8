//! Pipeline configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Separator placed between passages in the assembled context
pub const DEFAULT_CONTEXT_SEPARATOR: &str = "\n\n";

/// Retrieval settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieverConfig {
    /// Number of passages requested from the index
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_separator")]
    pub context_separator: String,
    #[serde(default = "default_retrieval_timeout_secs")]
    pub timeout_secs: u64,
}

/// Generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub model: String,
    /// Sampling temperature; 0.0 makes output reproducible
    #[serde(default)]
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_top_k() -> usize {
    3
}

fn default_separator() -> String {
    DEFAULT_CONTEXT_SEPARATOR.to_string()
}

fn default_retrieval_timeout_secs() -> u64 {
    10
}

fn default_generation_timeout_secs() -> u64 {
    60
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            context_separator: default_separator(),
            timeout_secs: default_retrieval_timeout_secs(),
        }
    }
}

impl RetrieverConfig {
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.top_k == 0 {
            return Err(DomainError::configuration("top_k must be greater than 0"));
        }

        if self.timeout_secs == 0 {
            return Err(DomainError::configuration(
                "retrieval timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl GeneratorConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
            timeout_secs: default_generation_timeout_secs(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.model.trim().is_empty() {
            return Err(DomainError::configuration("completion model is required"));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(DomainError::configuration(
                "temperature must be between 0.0 and 2.0",
            ));
        }

        if self.timeout_secs == 0 {
            return Err(DomainError::configuration(
                "generation timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}
