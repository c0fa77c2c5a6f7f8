use serde::{Deserialize, Serialize};

use super::Message;

/// Parameters for a single completion call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
            stop: None,
        }
    }

    pub fn builder() -> CompletionRequestBuilder {
        CompletionRequestBuilder::new()
    }

    /// Concatenated user-visible prompt text, used by providers without roles
    pub fn prompt_text(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.content())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Builder for CompletionRequest
#[derive(Debug, Default)]
pub struct CompletionRequestBuilder {
    messages: Vec<Message>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    stop: Option<Vec<String>>,
}

impl CompletionRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn system(self, content: impl Into<String>) -> Self {
        self.message(Message::system(content))
    }

    pub fn user(self, content: impl Into<String>) -> Self {
        self.message(Message::user(content))
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn build(self) -> CompletionRequest {
        CompletionRequest {
            messages: self.messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stop: self.stop,
        }
    }
}
