//! Google Gemini embedding provider implementation

use async_trait::async_trait;
use serde::Deserialize;

use super::HttpClientTrait;
use crate::domain::embedding::{
    Embedding, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse,
};
use crate::domain::DomainError;

pub(crate) const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini embedding provider (`:embedContent` / `:batchEmbedContents`)
#[derive(Debug)]
pub struct GeminiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
}

impl<C: HttpClientTrait> GeminiEmbeddingProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_GEMINI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Accepts both `text-embedding-004` and `models/text-embedding-004`
    fn resource_name(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        }
    }

    fn endpoint_url(&self, model: &str, method: &str) -> String {
        format!("{}/{}:{}", self.base_url, Self::resource_name(model), method)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("x-goog-api-key", self.api_key.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn content_request(request: &EmbeddingRequest, text: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": Self::resource_name(request.model()),
            "content": { "parts": [{ "text": text }] },
            "taskType": request.task().as_wire_name(),
        });

        if let Some(dims) = request.dimensions() {
            body["outputDimensionality"] = serde_json::json!(dims);
        }

        body
    }

    fn build_batch_request(&self, request: &EmbeddingRequest) -> serde_json::Value {
        let requests: Vec<serde_json::Value> = request
            .inputs()
            .into_iter()
            .map(|text| Self::content_request(request, text))
            .collect();

        serde_json::json!({ "requests": requests })
    }

    fn parse_single(
        &self,
        model: &str,
        json: serde_json::Value,
    ) -> Result<EmbeddingResponse, DomainError> {
        let response: GeminiEmbedContentResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("gemini", format!("Failed to parse embedding response: {}", e))
        })?;

        Ok(EmbeddingResponse::new(
            model,
            vec![Embedding::new(0, response.embedding.values)],
        ))
    }

    fn parse_batch(
        &self,
        model: &str,
        json: serde_json::Value,
    ) -> Result<EmbeddingResponse, DomainError> {
        let response: GeminiBatchEmbedResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("gemini", format!("Failed to parse embedding response: {}", e))
        })?;

        let embeddings = response
            .embeddings
            .into_iter()
            .enumerate()
            .map(|(index, e)| Embedding::new(index, e.values))
            .collect();

        Ok(EmbeddingResponse::new(model, embeddings))
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for GeminiEmbeddingProvider<C> {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        let inputs = request.inputs();

        if inputs.is_empty() {
            return Ok(EmbeddingResponse::new(request.model(), Vec::new()));
        }

        if let [text] = inputs.as_slice() {
            let url = self.endpoint_url(request.model(), "embedContent");
            let body = Self::content_request(&request, text);
            let response = self.client.post_json(&url, self.headers(), &body).await?;
            return self.parse_single(request.model(), response);
        }

        let url = self.endpoint_url(request.model(), "batchEmbedContents");
        let body = self.build_batch_request(&request);
        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_batch(request.model(), response)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

// Gemini API types for embeddings

#[derive(Debug, Deserialize)]
struct GeminiEmbeddingValues {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct GeminiEmbedContentResponse {
    embedding: GeminiEmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct GeminiBatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<GeminiEmbeddingValues>,
}
