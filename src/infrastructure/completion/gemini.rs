//! Google Gemini completion provider implementation

use async_trait::async_trait;
use serde::Deserialize;

use super::HttpClientTrait;
use crate::domain::{
    CompletionProvider, CompletionRequest, CompletionResponse, DomainError, FinishReason, Message,
    MessageRole, Usage,
};

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini `:generateContent` provider
#[derive(Debug)]
pub struct GeminiCompletionProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
}

impl<C: HttpClientTrait> GeminiCompletionProvider<C> {
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

    fn generate_url(&self, model: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("x-goog-api-key", self.api_key.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    /// System messages become `systemInstruction`; assistant turns use the `model` role
    fn build_request(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();

        for message in &request.messages {
            let part = serde_json::json!({ "text": message.content });
            match message.role {
                MessageRole::System => system_parts.push(part),
                MessageRole::User => {
                    contents.push(serde_json::json!({ "role": "user", "parts": [part] }))
                }
                MessageRole::Assistant => {
                    contents.push(serde_json::json!({ "role": "model", "parts": [part] }))
                }
            }
        }

        let mut body = serde_json::json!({ "contents": contents });

        if !system_parts.is_empty() {
            body["systemInstruction"] = serde_json::json!({ "parts": system_parts });
        }

        let mut generation_config = serde_json::Map::new();

        if let Some(temp) = request.temperature {
            generation_config.insert("temperature".to_string(), serde_json::json!(temp));
        }

        if let Some(max_tokens) = request.max_tokens {
            generation_config.insert("maxOutputTokens".to_string(), serde_json::json!(max_tokens));
        }

        if let Some(ref stop) = request.stop {
            generation_config.insert("stopSequences".to_string(), serde_json::json!(stop));
        }

        if !generation_config.is_empty() {
            body["generationConfig"] = serde_json::Value::Object(generation_config);
        }

        body
    }

    fn parse_response(
        &self,
        model: &str,
        json: serde_json::Value,
    ) -> Result<CompletionResponse, DomainError> {
        let response: GeminiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("gemini", format!("Failed to parse response: {}", e))
        })?;

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider("gemini", "No candidates in response"))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(DomainError::provider("gemini", "Candidate has no text"));
        }

        let model = response.model_version.unwrap_or_else(|| model.to_string());
        let mut completion = CompletionResponse::new(model, Message::assistant(text));

        if let Some(reason) = candidate.finish_reason {
            completion = completion.with_finish_reason(FinishReason::from_provider(&reason));
        }

        if let Some(usage) = response.usage_metadata {
            completion = completion.with_usage(Usage::new(
                usage.prompt_token_count,
                usage.candidates_token_count,
            ));
        }

        Ok(completion)
    }
}

#[async_trait]
impl<C: HttpClientTrait> CompletionProvider for GeminiCompletionProvider<C> {
    async fn complete(
        &self,
        model: &str,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, DomainError> {
        let url = self.generate_url(model);
        let body = self.build_request(&request);
        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(model, response)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

// Gemini API types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;

    const TEST_URL: &str =
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

    fn candidate_response(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 42, "candidatesTokenCount": 7 },
            "modelVersion": "gemini-2.5-flash"
        })
    }

    #[tokio::test]
    async fn test_generate_content() {
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            candidate_response("Agentic AI refers to autonomous systems."),
        );
        let provider = GeminiCompletionProvider::new(client, "key");

        let request = CompletionRequest::builder()
            .user("Answer based ONLY on the context:")
            .temperature(0.0)
            .build();
        let response = provider.complete("gemini-2.5-flash", request).await.unwrap();

        assert_eq!(response.content(), "Agentic AI refers to autonomous systems.");
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.map(|u| u.prompt_tokens), Some(42));

        let (_, body) = provider.client.requests().remove(0);
        assert_eq!(body["generationConfig"]["temperature"], 0.0);
        assert_eq!(body["contents"][0]["role"], "user");
    }

    #[tokio::test]
    async fn test_system_message_becomes_instruction() {
        let client = MockHttpClient::new().with_response(TEST_URL, candidate_response("ok"));
        let provider = GeminiCompletionProvider::new(client, "key");

        let request = CompletionRequest::builder()
            .system("Be brief.")
            .user("Hi")
            .build();
        provider.complete("models/gemini-2.5-flash", request).await.unwrap();

        let (url, body) = provider.client.requests().remove(0);
        assert_eq!(url, TEST_URL);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be brief.");
        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
        assert!(body.get("generationConfig").is_none());
    }

    #[tokio::test]
    async fn test_empty_candidates_is_error() {
        let client =
            MockHttpClient::new().with_response(TEST_URL, serde_json::json!({ "candidates": [] }));
        let provider = GeminiCompletionProvider::new(client, "key");

        let error = provider
            .complete("gemini-2.5-flash", CompletionRequest::builder().user("q").build())
            .await
            .unwrap_err();

        assert!(error.to_string().contains("No candidates"));
    }

    #[tokio::test]
    async fn test_candidate_without_text_is_error() {
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            serde_json::json!({ "candidates": [{ "finishReason": "SAFETY" }] }),
        );
        let provider = GeminiCompletionProvider::new(client, "key");

        let result = provider
            .complete("gemini-2.5-flash", CompletionRequest::builder().user("q").build())
            .await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_rate_limit_propagates() {
        let client = MockHttpClient::new()
            .with_error(TEST_URL, DomainError::rate_limited("http", "quota exceeded"));
        let provider = GeminiCompletionProvider::new(client, "key");

        let error = provider
            .complete("gemini-2.5-flash", CompletionRequest::builder().user("q").build())
            .await
            .unwrap_err();

        assert!(error.is_rate_limited());
    }
}
