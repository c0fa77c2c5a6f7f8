use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::pinecone::PINECONE_CONTROL_PLANE_URL;
use super::{HttpClient, InMemoryVectorIndex, PineconeIndex};
use crate::domain::{DomainError, VectorIndex};
use crate::infrastructure::credentials::env_api_key;

/// Supported vector index backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorIndexType {
    Pinecone,
    InMemory,
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndexConfig {
    pub provider: VectorIndexType,
    pub name: String,
    /// Data-plane host; looked up from the index name when absent
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            provider: VectorIndexType::Pinecone,
            name: "agentic-ai".to_string(),
            host: None,
            namespace: None,
            api_key_env: "PINECONE_API_KEY".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Factory for creating vector index clients
#[derive(Debug)]
pub struct VectorIndexFactory;

impl VectorIndexFactory {
    /// Create an index client; `dimensions` bounds the in-memory index
    pub async fn create(
        config: &VectorIndexConfig,
        dimensions: usize,
    ) -> Result<Arc<dyn VectorIndex>, DomainError> {
        match config.provider {
            VectorIndexType::InMemory => Ok(Self::create_in_memory(config, dimensions)),
            VectorIndexType::Pinecone => {
                let api_key = env_api_key(&config.api_key_env)?;
                Self::create_pinecone(config, api_key).await
            }
        }
    }

    pub fn create_in_memory(config: &VectorIndexConfig, dimensions: usize) -> Arc<dyn VectorIndex> {
        Arc::new(InMemoryVectorIndex::new(&config.name).with_dimension(dimensions))
    }

    pub async fn create_pinecone(
        config: &VectorIndexConfig,
        api_key: String,
    ) -> Result<Arc<dyn VectorIndex>, DomainError> {
        let http_client = HttpClient::with_timeout(Duration::from_secs(config.timeout_secs))?;

        let index = match &config.host {
            Some(host) => PineconeIndex::new(http_client, &config.name, api_key, host),
            None => {
                PineconeIndex::resolve(
                    http_client,
                    &config.name,
                    api_key,
                    PINECONE_CONTROL_PLANE_URL,
                )
                .await?
            }
        };

        let index = match &config.namespace {
            Some(namespace) => index.with_namespace(namespace),
            None => index,
        };

        Ok(Arc::new(index))
    }
}
