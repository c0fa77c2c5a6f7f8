//! Grounded answer generator

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::debug;

use crate::domain::{
    grounded_prompt, CompletionProvider, CompletionRequest, CompletionResponse, DomainError,
    Generation, Generator, GeneratorConfig, Question,
};
use crate::infrastructure::observability::{record_completion_request, CompletionMetricParams};

/// Generator that answers strictly from the supplied context
#[derive(Debug)]
pub struct GroundedGenerator {
    provider: Arc<dyn CompletionProvider>,
    config: GeneratorConfig,
    timeout: Duration,
}

impl GroundedGenerator {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: GeneratorConfig) -> Self {
        let timeout = config.timeout();

        Self {
            provider,
            config,
            timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_request(&self, question: &Question, context: &str) -> CompletionRequest {
        let mut builder = CompletionRequest::builder()
            .user(grounded_prompt(question.as_str(), context))
            .temperature(self.config.temperature);

        if let Some(max_tokens) = self.config.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }

        builder.build()
    }

    async fn call_provider(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, DomainError> {
        match timeout(self.timeout, self.provider.complete(&self.config.model, request)).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::timeout(
                "generation",
                self.timeout.as_millis() as u64,
            )),
        }
    }
}

#[async_trait]
impl Generator for GroundedGenerator {
    async fn generate(
        &self,
        question: &Question,
        context: &str,
    ) -> Result<Generation, DomainError> {
        let request = self.build_request(question, context);
        let started = Instant::now();

        let result = self.call_provider(request).await;

        let usage = result.as_ref().ok().and_then(|r| r.usage.clone());
        record_completion_request(CompletionMetricParams {
            provider: self.provider.provider_name(),
            model: &self.config.model,
            duration: started.elapsed(),
            success: result.is_ok(),
            input_tokens: usage.as_ref().map(|u| u.prompt_tokens as u64),
            output_tokens: usage.as_ref().map(|u| u.completion_tokens as u64),
        });

        let response = result?;
        let answer = response.content();

        if answer.trim().is_empty() {
            return Err(DomainError::provider(
                self.provider.provider_name(),
                "completion returned no text",
            ));
        }

        debug!(
            model = %response.model,
            chars = answer.len(),
            "Generated grounded answer"
        );

        Ok(Generation::new(answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockCompletionProvider, GROUNDING_INSTRUCTION, REFUSAL_INSTRUCTION};

    fn question(text: &str) -> Question {
        Question::parse(text).unwrap()
    }

    #[derive(Debug)]
    struct StalledProvider;

    #[async_trait]
    impl CompletionProvider for StalledProvider {
        async fn complete(
            &self,
            _model: &str,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, DomainError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(DomainError::internal("unreachable"))
        }

        fn provider_name(&self) -> &'static str {
            "stalled"
        }
    }

    #[tokio::test]
    async fn test_prompt_is_grounded_and_deterministic() {
        let provider = Arc::new(MockCompletionProvider::new("Agentic AI acts autonomously."));
        let generator =
            GroundedGenerator::new(provider.clone(), GeneratorConfig::new("gemini-2.5-flash"));

        let generation = generator
            .generate(
                &question("What is the definition of Agentic AI?"),
                "Agentic AI refers to systems that pursue goals autonomously.",
            )
            .await
            .unwrap();

        assert_eq!(generation.answer, "Agentic AI acts autonomously.");

        let (model, request) = provider.last_request().unwrap();
        assert_eq!(model, "gemini-2.5-flash");
        assert_eq!(request.temperature, Some(0.0));

        let prompt = request.prompt_text();
        assert!(prompt.starts_with(GROUNDING_INSTRUCTION));
        assert!(prompt.contains(REFUSAL_INSTRUCTION));
        assert!(prompt.contains("Context: Agentic AI refers to systems that pursue goals autonomously."));
        assert!(prompt.contains("Question: What is the definition of Agentic AI?"));
    }

    #[tokio::test]
    async fn test_empty_context_still_calls_model() {
        let provider = Arc::new(MockCompletionProvider::new(
            "The information is not available in the provided context.",
        ));
        let generator =
            GroundedGenerator::new(provider.clone(), GeneratorConfig::new("gemini-2.5-flash"));

        generator
            .generate(&question("Who won the FIFA World Cup in 2022?"), "")
            .await
            .unwrap();

        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_max_tokens_is_forwarded() {
        let provider = Arc::new(MockCompletionProvider::new("ok"));
        let generator = GroundedGenerator::new(
            provider.clone(),
            GeneratorConfig::new("gemini-2.5-flash").with_max_tokens(256),
        );

        generator.generate(&question("q"), "ctx").await.unwrap();

        let (_, request) = provider.last_request().unwrap();
        assert_eq!(request.max_tokens, Some(256));
    }

    #[tokio::test]
    async fn test_answer_is_returned_verbatim() {
        let raw = "  Agents act.\n\n- plan\n- execute\n";
        let provider = Arc::new(MockCompletionProvider::new(raw));
        let generator = GroundedGenerator::new(provider, GeneratorConfig::new("m"));

        let generation = generator.generate(&question("q"), "ctx").await.unwrap();

        assert_eq!(generation.answer, raw);
    }

    #[tokio::test]
    async fn test_blank_answer_is_error() {
        let provider = Arc::new(MockCompletionProvider::new("   "));
        let generator = GroundedGenerator::new(provider, GeneratorConfig::new("m"));

        assert!(generator.generate(&question("q"), "ctx").await.is_err());
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = Arc::new(
            MockCompletionProvider::new("unused")
                .with_error(DomainError::rate_limited("gemini", "quota exceeded")),
        );
        let generator = GroundedGenerator::new(provider, GeneratorConfig::new("m"));

        let error = generator.generate(&question("q"), "ctx").await.unwrap_err();

        assert!(error.is_rate_limited());
    }

    #[tokio::test]
    async fn test_slow_generation_times_out() {
        let generator = GroundedGenerator::new(Arc::new(StalledProvider), GeneratorConfig::new("m"))
            .with_timeout(Duration::from_millis(20));

        let error = generator.generate(&question("q"), "ctx").await.unwrap_err();

        assert!(error.is_timeout());
    }
}
