use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::HttpClientTrait;
use crate::domain::{
    CompletionProvider, CompletionRequest, CompletionResponse, DomainError, FinishReason, Message,
    MessageRole, Usage,
};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// OpenAI-compatible chat completions provider
#[derive(Debug)]
pub struct OpenAiCompletionProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
}

impl<C: HttpClientTrait> OpenAiCompletionProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn build_request(&self, model: &str, request: &CompletionRequest) -> serde_json::Value {
        let messages: Vec<OpenAiMessage> =
            request.messages.iter().map(OpenAiMessage::from_domain).collect();

        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
            "stream": false,
        });

        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if let Some(ref stop) = request.stop {
            body["stop"] = serde_json::json!(stop);
        }

        body
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<CompletionResponse, DomainError> {
        let response: OpenAiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider("openai", "No choices in response"))?;

        let content = choice
            .message
            .content
            .filter(|c| !c.is_empty())
            .ok_or_else(|| DomainError::provider("openai", "Empty message content"))?;

        let mut completion = CompletionResponse::new(response.model, Message::assistant(content));

        if let Some(reason) = choice.finish_reason {
            completion = completion.with_finish_reason(FinishReason::from_provider(&reason));
        }

        if let Some(usage) = response.usage {
            completion =
                completion.with_usage(Usage::new(usage.prompt_tokens, usage.completion_tokens));
        }

        Ok(completion)
    }
}

#[async_trait]
impl<C: HttpClientTrait> CompletionProvider for OpenAiCompletionProvider<C> {
    async fn complete(
        &self,
        model: &str,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, DomainError> {
        let url = self.chat_completions_url();
        let body = self.build_request(model, &request);
        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

impl OpenAiMessage {
    fn from_domain(message: &Message) -> Self {
        let role = match message.role {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };

        Self {
            role,
            content: message.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;

    const TEST_URL: &str = "https://api.openai.com/v1/chat/completions";

    fn create_mock_response(content: Option<&str>) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30 }
        })
    }

    #[tokio::test]
    async fn test_complete_success() {
        let client =
            MockHttpClient::new().with_response(TEST_URL, create_mock_response(Some("Hello!")));
        let provider = OpenAiCompletionProvider::new(client, "test-key");

        let request = CompletionRequest::builder()
            .user("Hello")
            .temperature(0.0)
            .build();
        let response = provider.complete("gpt-4o-mini", request).await.unwrap();

        assert_eq!(response.content(), "Hello!");
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.map(|u| u.total_tokens), Some(30));

        let (_, body) = provider.client.requests().remove(0);
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["model"], "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_empty_content_is_error() {
        let client = MockHttpClient::new().with_response(TEST_URL, create_mock_response(None));
        let provider = OpenAiCompletionProvider::new(client, "test-key");

        let result = provider
            .complete("gpt-4o-mini", CompletionRequest::builder().user("Hi").build())
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_no_choices_is_error() {
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            serde_json::json!({ "model": "gpt-4o-mini", "choices": [] }),
        );
        let provider = OpenAiCompletionProvider::new(client, "test-key");

        let error = provider
            .complete("gpt-4o-mini", CompletionRequest::builder().user("Hi").build())
            .await
            .unwrap_err();

        assert!(error.to_string().contains("No choices"));
    }
}
