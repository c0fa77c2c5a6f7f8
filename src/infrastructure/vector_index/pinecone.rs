//! Pinecone vector index over the REST data plane

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::HttpClientTrait;
use crate::domain::vector_index::{
    IndexRecord, RetrievedPassage, VectorIndex, CONTENT_METADATA_KEY,
};
use crate::domain::DomainError;

pub(crate) const PINECONE_CONTROL_PLANE_URL: &str = "https://api.pinecone.io";
const PINECONE_API_VERSION: &str = "2024-07";

/// Metrics whose scores rank higher-is-better, as the relevance threshold assumes
const SIMILARITY_METRICS: [&str; 2] = ["cosine", "dotproduct"];

/// Pinecone index bound to one data-plane host
#[derive(Debug)]
pub struct PineconeIndex<C: HttpClientTrait> {
    client: C,
    name: String,
    api_key: String,
    host: String,
    namespace: Option<String>,
}

impl<C: HttpClientTrait> PineconeIndex<C> {
    pub fn new(
        client: C,
        name: impl Into<String>,
        api_key: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        let host = host.into();
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host
        } else {
            format!("https://{}", host)
        };

        Self {
            client,
            name: name.into(),
            api_key: api_key.into(),
            host: host.trim_end_matches('/').to_string(),
            namespace: None,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Look up the data-plane host of index `name` through the control plane
    pub async fn resolve(
        client: C,
        name: impl Into<String>,
        api_key: impl Into<String>,
        control_plane_url: &str,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        let api_key = api_key.into();
        let url = format!(
            "{}/indexes/{}",
            control_plane_url.trim_end_matches('/'),
            name
        );

        let json = client
            .get_json(
                &url,
                vec![
                    ("Api-Key", api_key.as_str()),
                    ("X-Pinecone-API-Version", PINECONE_API_VERSION),
                ],
            )
            .await
            .map_err(|e| DomainError::vector_index(format!("Failed to describe index: {}", e)))?;

        let description: PineconeIndexDescription = serde_json::from_value(json).map_err(|e| {
            DomainError::vector_index(format!("Malformed index description: {}", e))
        })?;

        if let Some(metric) = description.metric.as_deref() {
            if !SIMILARITY_METRICS.contains(&metric) {
                return Err(DomainError::configuration(format!(
                    "index '{}' uses the '{}' metric; expected one of {}",
                    name,
                    metric,
                    SIMILARITY_METRICS.join(", ")
                )));
            }
        }

        debug!(
            index = %name,
            host = %description.host,
            metric = description.metric.as_deref().unwrap_or("unknown"),
            "Resolved Pinecone index host"
        );

        Ok(Self::new(client, name, api_key, description.host))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.host, path)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Api-Key", self.api_key.as_str()),
            ("X-Pinecone-API-Version", PINECONE_API_VERSION),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_query(&self, vector: &[f32], top_k: usize) -> serde_json::Value {
        let mut body = serde_json::json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
            "includeValues": false,
        });

        if let Some(ref namespace) = self.namespace {
            body["namespace"] = serde_json::json!(namespace);
        }

        body
    }

    fn build_upsert(&self, records: Vec<IndexRecord>) -> serde_json::Value {
        let vectors: Vec<serde_json::Value> = records
            .into_iter()
            .map(|record| {
                let mut metadata = serde_json::Map::from_iter(record.metadata);
                metadata.insert(
                    CONTENT_METADATA_KEY.to_string(),
                    serde_json::Value::String(record.content),
                );

                serde_json::json!({
                    "id": record.id,
                    "values": record.values,
                    "metadata": metadata,
                })
            })
            .collect();

        let mut body = serde_json::json!({ "vectors": vectors });

        if let Some(ref namespace) = self.namespace {
            body["namespace"] = serde_json::json!(namespace);
        }

        body
    }

    fn parse_matches(&self, json: serde_json::Value) -> Result<Vec<RetrievedPassage>, DomainError> {
        let response: PineconeQueryResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::vector_index(format!("Malformed query response: {}", e))
        })?;

        response
            .matches
            .into_iter()
            .map(|m| {
                let content = m
                    .metadata
                    .as_ref()
                    .and_then(|meta| meta.get(CONTENT_METADATA_KEY))
                    .and_then(|value| value.as_str())
                    .ok_or_else(|| {
                        DomainError::vector_index(format!(
                            "Match {} has no '{}' metadata",
                            m.id, CONTENT_METADATA_KEY
                        ))
                    })?;

                Ok(RetrievedPassage::new(m.id.clone(), content, m.score))
            })
            .collect()
    }

    async fn describe_stats(&self) -> Result<PineconeIndexStats, DomainError> {
        let json = self
            .client
            .post_json(
                &self.url("describe_index_stats"),
                self.headers(),
                &serde_json::json!({}),
            )
            .await?;

        serde_json::from_value(json)
            .map_err(|e| DomainError::vector_index(format!("Malformed index stats: {}", e)))
    }
}

#[async_trait]
impl<C: HttpClientTrait> VectorIndex for PineconeIndex<C> {
    fn index_name(&self) -> &str {
        &self.name
    }

    fn provider_type(&self) -> &'static str {
        "pinecone"
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedPassage>, DomainError> {
        let body = self.build_query(vector, top_k);
        let response = self
            .client
            .post_json(&self.url("query"), self.headers(), &body)
            .await?;

        self.parse_matches(response)
    }

    async fn upsert(&self, records: Vec<IndexRecord>) -> Result<usize, DomainError> {
        if records.is_empty() {
            return Ok(0);
        }

        let expected = records.len();
        let body = self.build_upsert(records);
        let response = self
            .client
            .post_json(&self.url("vectors/upsert"), self.headers(), &body)
            .await?;

        let upserted = response
            .get("upsertedCount")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(expected);

        Ok(upserted)
    }

    async fn dimension(&self) -> Result<Option<usize>, DomainError> {
        Ok(self.describe_stats().await?.dimension)
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        Ok(self.describe_stats().await.is_ok())
    }
}

// Pinecone API types

#[derive(Debug, Deserialize)]
struct PineconeIndexDescription {
    host: String,
    #[serde(default)]
    metric: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PineconeQueryResponse {
    #[serde(default)]
    matches: Vec<PineconeMatch>,
}

#[derive(Debug, Deserialize)]
struct PineconeMatch {
    id: String,
    score: f32,
    #[serde(default)]
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PineconeIndexStats {
    dimension: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;

    const HOST: &str = "https://agentic-ai-abc123.svc.pinecone.io";

    fn index(client: MockHttpClient) -> PineconeIndex<MockHttpClient> {
        PineconeIndex::new(client, "agentic-ai", "pc-key", "agentic-ai-abc123.svc.pinecone.io")
    }

    #[tokio::test]
    async fn test_query_maps_matches() {
        let client = MockHttpClient::new().with_response(
            format!("{}/query", HOST),
            serde_json::json!({
                "matches": [
                    { "id": "ebook_chunk_3", "score": 0.83, "metadata": { "text": "Agentic AI is..." } },
                    { "id": "ebook_chunk_9", "score": 0.71, "metadata": { "text": "Agents plan." } }
                ],
                "namespace": ""
            }),
        );
        let index = index(client);

        let passages = index.query(&[0.1; 512], 3).await.unwrap();

        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].content, "Agentic AI is...");
        assert_eq!(passages[0].score, 0.83);

        let (_, body) = index.client.requests().remove(0);
        assert_eq!(body["topK"], 3);
        assert_eq!(body["includeMetadata"], true);
        assert_eq!(body["vector"].as_array().unwrap().len(), 512);
    }

    #[tokio::test]
    async fn test_match_without_text_is_malformed() {
        let client = MockHttpClient::new().with_response(
            format!("{}/query", HOST),
            serde_json::json!({ "matches": [{ "id": "x", "score": 0.5, "metadata": {} }] }),
        );

        let result = index(client).query(&[0.1; 4], 3).await;

        assert!(matches!(result, Err(DomainError::VectorIndex { .. })));
    }

    #[tokio::test]
    async fn test_upsert_stores_text_in_metadata() {
        let client = MockHttpClient::new().with_response(
            format!("{}/vectors/upsert", HOST),
            serde_json::json!({ "upsertedCount": 1 }),
        );
        let index = index(client).with_namespace("docs");

        let record = IndexRecord::new("ebook_chunk_0", vec![0.5; 4], "chunk text")
            .with_metadata("source", serde_json::json!("ebook"));
        let upserted = index.upsert(vec![record]).await.unwrap();

        assert_eq!(upserted, 1);

        let (_, body) = index.client.requests().remove(0);
        assert_eq!(body["namespace"], "docs");
        assert_eq!(body["vectors"][0]["id"], "ebook_chunk_0");
        assert_eq!(body["vectors"][0]["metadata"]["text"], "chunk text");
        assert_eq!(body["vectors"][0]["metadata"]["source"], "ebook");
    }

    #[tokio::test]
    async fn test_dimension_and_health() {
        let client = MockHttpClient::new().with_response(
            format!("{}/describe_index_stats", HOST),
            serde_json::json!({ "dimension": 512, "totalVectorCount": 120, "namespaces": {} }),
        );
        let index = index(client);

        assert_eq!(index.dimension().await.unwrap(), Some(512));
        assert!(index.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_unreachable_index_is_unhealthy() {
        let index = index(MockHttpClient::new());

        assert!(!index.health_check().await.unwrap());
        assert!(index.dimension().await.is_err());
    }

    #[tokio::test]
    async fn test_resolve_host_from_control_plane() {
        let client = MockHttpClient::new().with_response(
            "https://api.pinecone.io/indexes/agentic-ai",
            serde_json::json!({
                "name": "agentic-ai",
                "dimension": 512,
                "metric": "cosine",
                "host": "agentic-ai-abc123.svc.pinecone.io"
            }),
        );

        let index =
            PineconeIndex::resolve(client, "agentic-ai", "pc-key", PINECONE_CONTROL_PLANE_URL)
                .await
                .unwrap();

        assert_eq!(index.url("query"), format!("{}/query", HOST));
        assert_eq!(index.index_name(), "agentic-ai");
    }

    #[tokio::test]
    async fn test_resolve_rejects_distance_metric() {
        let client = MockHttpClient::new().with_response(
            "https://api.pinecone.io/indexes/agentic-ai",
            serde_json::json!({
                "name": "agentic-ai",
                "dimension": 512,
                "metric": "euclidean",
                "host": "agentic-ai-abc123.svc.pinecone.io"
            }),
        );

        let result =
            PineconeIndex::resolve(client, "agentic-ai", "pc-key", PINECONE_CONTROL_PLANE_URL)
                .await;

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_query_keeps_provider_rank_order() {
        let client = MockHttpClient::new().with_response(
            format!("{}/query", HOST),
            serde_json::json!({
                "matches": [
                    { "id": "first", "score": 0.10, "metadata": { "text": "first" } },
                    { "id": "second", "score": 0.40, "metadata": { "text": "second" } }
                ]
            }),
        );

        let passages = index(client).query(&[0.1; 4], 3).await.unwrap();

        let ids: Vec<&str> = passages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }
}
