use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};

use crate::domain::DomainError;

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError>;

    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<serde_json::Value, DomainError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: None,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            timeout: Some(timeout),
        })
    }

    async fn send(
        &self,
        url: &str,
        mut request: RequestBuilder,
        headers: Vec<(&str, &str)>,
    ) -> Result<serde_json::Value, DomainError> {
        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(|e| self.transport_error(url, e))?;

        Self::decode(response).await
    }

    fn transport_error(&self, url: &str, error: reqwest::Error) -> DomainError {
        if error.is_timeout() {
            let timeout_ms = self.timeout.map(|t| t.as_millis() as u64).unwrap_or(0);
            return DomainError::timeout(format!("request to {}", url), timeout_ms);
        }

        DomainError::provider("http", format!("Request failed: {}", error))
    }

    async fn decode(response: Response) -> Result<serde_json::Value, DomainError> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::rate_limited("http", error_body));
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::provider(
                "http",
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::provider("http", format!("Failed to parse response: {}", e)))
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError> {
        self.send(url, self.client.post(url).json(body), headers).await
    }

    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<serde_json::Value, DomainError> {
        self.send(url, self.client.get(url), headers).await
    }
}
