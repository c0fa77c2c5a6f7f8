use serde::Deserialize;

use crate::domain::{
    ChunkingConfig, DomainError, IngestionConfig, RetrieverConfig, DEFAULT_CONTEXT_SEPARATOR,
};
use crate::infrastructure::completion::CompletionProviderConfig;
use crate::infrastructure::embedding::EmbeddingProviderConfig;
use crate::infrastructure::observability::ObservabilityConfig;
use crate::infrastructure::vector_index::VectorIndexConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub embedding: EmbeddingProviderConfig,
    #[serde(default)]
    pub completion: CompletionProviderConfig,
    #[serde(default)]
    pub index: VectorIndexConfig,
    #[serde(default)]
    pub ingestion: IngestionSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Query-time pipeline settings
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_separator")]
    pub context_separator: String,
    /// Minimum similarity for an answer to be flagged relevant
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f32,
    #[serde(default = "default_retrieval_timeout_secs")]
    pub retrieval_timeout_secs: u64,
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,
}

/// Offline ingestion settings
#[derive(Debug, Clone, Deserialize)]
pub struct IngestionSettings {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_top_k() -> usize {
    3
}

fn default_separator() -> String {
    DEFAULT_CONTEXT_SEPARATOR.to_string()
}

fn default_relevance_threshold() -> f32 {
    0.5
}

fn default_retrieval_timeout_secs() -> u64 {
    10
}

fn default_generation_timeout_secs() -> u64 {
    60
}

fn default_batch_size() -> usize {
    100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            context_separator: default_separator(),
            relevance_threshold: default_relevance_threshold(),
            retrieval_timeout_secs: default_retrieval_timeout_secs(),
            generation_timeout_secs: default_generation_timeout_secs(),
        }
    }
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            batch_size: default_batch_size(),
        }
    }
}

impl PipelineSettings {
    pub fn retriever_config(&self) -> RetrieverConfig {
        RetrieverConfig {
            top_k: self.top_k,
            context_separator: self.context_separator.clone(),
            timeout_secs: self.retrieval_timeout_secs,
        }
    }
}

impl IngestionSettings {
    pub fn ingestion_config(&self) -> IngestionConfig {
        IngestionConfig::new()
            .with_chunking(self.chunking.clone())
            .with_batch_size(self.batch_size)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Cross-section checks that serde defaults cannot express
    pub fn validate(&self) -> Result<(), DomainError> {
        self.pipeline.retriever_config().validate()?;
        self.completion
            .generator_config(self.pipeline.generation_timeout_secs)
            .validate()?;
        self.ingestion.chunking.validate()?;

        if self.embedding.dimensions == 0 {
            return Err(DomainError::configuration(
                "embedding.dimensions must be greater than 0",
            ));
        }

        if self.ingestion.batch_size == 0 {
            return Err(DomainError::configuration(
                "ingestion.batch_size must be greater than 0",
            ));
        }

        Ok(())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
