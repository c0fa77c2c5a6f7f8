//! Linear retrieve-then-generate orchestrator

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};

use crate::domain::{Generator, PipelineError, PipelineState, Question, Retriever};
use crate::infrastructure::observability::{record_pipeline_run, record_pipeline_stage};

/// Runs Retriever then Generator over a fresh state per question
#[derive(Debug, Clone)]
pub struct RagPipeline {
    retriever: Arc<dyn Retriever>,
    generator: Arc<dyn Generator>,
}

impl RagPipeline {
    pub fn new(retriever: Arc<dyn Retriever>, generator: Arc<dyn Generator>) -> Self {
        Self {
            retriever,
            generator,
        }
    }

    /// Answer one question. Any stage failure aborts the run and no state is returned.
    #[instrument(skip(self, question))]
    pub async fn run(&self, question: &str) -> Result<PipelineState, PipelineError> {
        let started = Instant::now();
        let result = self.execute(question).await;

        match &result {
            Ok(state) => {
                info!(
                    similarity = state.score(),
                    passages = state.passages_used(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Pipeline run complete"
                );
                record_pipeline_run("success", started.elapsed(), Some(state.score()));
            }
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Pipeline run failed");
                record_pipeline_run(e.kind(), started.elapsed(), None);
            }
        }

        result
    }

    async fn execute(&self, question: &str) -> Result<PipelineState, PipelineError> {
        let state = PipelineState::new(Question::parse(question)?);

        let stage_started = Instant::now();
        let retrieval = self.retriever.retrieve(state.question()).await;
        record_pipeline_stage("retrieval", retrieval.is_ok(), stage_started.elapsed());
        let state = state.with_retrieval(retrieval.map_err(PipelineError::Retrieval)?)?;

        let stage_started = Instant::now();
        let generation = self
            .generator
            .generate(state.question(), state.context())
            .await;
        record_pipeline_stage("generation", generation.is_ok(), stage_started.elapsed());

        state.with_generation(generation.map_err(PipelineError::Generation)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        DomainError, EchoGenerator, GeneratorConfig, MockCompletionProvider,
        MockEmbeddingProvider, MockRetriever, MockVectorIndex, PipelineStage, Retrieval,
        RetrievedPassage, RetrieverConfig, TruncatingEmbedder,
    };
    use crate::infrastructure::pipeline::{GroundedGenerator, VectorRetriever};

    fn passage(id: &str, content: &str, score: f32) -> RetrievedPassage {
        RetrievedPassage::new(id, content, score)
    }

    fn wired(
        index: MockVectorIndex,
        answer: &str,
    ) -> (RagPipeline, Arc<MockVectorIndex>, Arc<MockCompletionProvider>) {
        let index = Arc::new(index);
        let completion = Arc::new(MockCompletionProvider::new(answer));
        let embedder = Arc::new(
            TruncatingEmbedder::new(Arc::new(MockEmbeddingProvider::new(768)), "mock", 512)
                .unwrap(),
        );

        let retriever = VectorRetriever::new(embedder, index.clone(), RetrieverConfig::default());
        let generator =
            GroundedGenerator::new(completion.clone(), GeneratorConfig::new("gemini-2.5-flash"));

        (
            RagPipeline::new(Arc::new(retriever), Arc::new(generator)),
            index,
            completion,
        )
    }

    #[tokio::test]
    async fn test_happy_path_produces_complete_state() {
        let (pipeline, _, completion) = wired(
            MockVectorIndex::new().with_passages(vec![
                passage("1", "Agentic AI refers to systems that act autonomously.", 0.86),
                passage("2", "Agents plan, use tools, and reflect.", 0.74),
            ]),
            "Agentic AI is AI that acts autonomously toward goals.",
        );

        let state = pipeline
            .run("What is the definition of Agentic AI?")
            .await
            .unwrap();

        assert_eq!(state.stage(), PipelineStage::Done);
        assert!(!state.answer().unwrap().is_empty());
        assert!(state.is_relevant(0.5));
        assert_eq!(state.score(), 0.86);
        assert_eq!(completion.call_count(), 1);
    }

    #[tokio::test]
    async fn test_no_matches_still_generates() {
        let (pipeline, _, completion) = wired(
            MockVectorIndex::new(),
            "The information is not available in the provided context.",
        );

        let state = pipeline
            .run("Who won the FIFA World Cup in 2022?")
            .await
            .unwrap();

        assert_eq!(state.context(), "");
        assert_eq!(state.score(), 0.0);
        assert_eq!(completion.call_count(), 1);

        let (_, request) = completion.last_request().unwrap();
        assert!(request.prompt_text().contains("Context: \nQuestion:"));
    }

    #[tokio::test]
    async fn test_retrieval_failure_never_reaches_generation() {
        let (pipeline, index, completion) = wired(MockVectorIndex::new().failing(), "unused");

        let error = pipeline.run("What is Agentic AI?").await.unwrap_err();

        assert!(matches!(error, PipelineError::Retrieval(_)));
        assert_eq!(index.query_count(), 0);
        assert_eq!(completion.call_count(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_returns_no_state() {
        let retriever = Arc::new(MockRetriever::returning(Retrieval::empty()));
        let generator = Arc::new(EchoGenerator::failing(DomainError::provider(
            "gemini",
            "HTTP 500",
        )));
        let pipeline = RagPipeline::new(retriever, generator.clone());

        let error = pipeline.run("q").await.unwrap_err();

        assert!(matches!(error, PipelineError::Generation(_)));
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_blank_question_is_rejected_before_retrieval() {
        let retriever = Arc::new(MockRetriever::returning(Retrieval::empty()));
        let generator = Arc::new(EchoGenerator::new());
        let pipeline = RagPipeline::new(retriever.clone(), generator.clone());

        let error = pipeline.run("   ").await.unwrap_err();

        assert!(matches!(error, PipelineError::Validation(_)));
        assert_eq!(retriever.call_count(), 0);
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_generator_sees_full_context() {
        let retrieval = Retrieval::from_passages(
            vec![passage("a", "first", 0.9), passage("b", "second", 0.8)],
            3,
            "\n\n",
        );
        let generator = Arc::new(EchoGenerator::new());
        let pipeline = RagPipeline::new(
            Arc::new(MockRetriever::returning(retrieval)),
            generator.clone(),
        );

        let state = pipeline.run("q").await.unwrap();

        assert_eq!(generator.contexts(), vec!["first\n\nsecond".to_string()]);
        assert_eq!(state.answer(), Some("q => first\n\nsecond"));
    }

    #[tokio::test]
    async fn test_runs_do_not_share_state() {
        let retriever = MockRetriever::returning(Retrieval::empty())
            .with_answer_for(
                "What do agents plan?",
                Retrieval::from_passages(
                    vec![
                        passage("plan_0", "Agents plan multi-step tasks.", 0.91),
                        passage("plan_1", "Planning uses a scratchpad.", 0.77),
                    ],
                    3,
                    "\n\n",
                ),
            )
            .with_answer_for(
                "How do agents use tools?",
                Retrieval::from_passages(
                    vec![passage("tools_0", "Tools are called via function schemas.", 0.64)],
                    3,
                    "\n\n",
                ),
            );
        let pipeline = RagPipeline::new(Arc::new(retriever), Arc::new(EchoGenerator::new()));

        let first = pipeline.run("What do agents plan?").await.unwrap();
        let second = pipeline.run("How do agents use tools?").await.unwrap();
        let third = pipeline.run("Unrelated question").await.unwrap();

        assert_eq!(first.score(), 0.91);
        assert_eq!(second.score(), 0.64);
        assert_eq!(second.passages_used(), 1);
        assert_eq!(second.context(), "Tools are called via function schemas.");
        assert_eq!(
            second.answer(),
            Some("How do agents use tools? => Tools are called via function schemas.")
        );

        for leaked in ["plan", "scratchpad", "What do agents plan?"] {
            assert!(!second.context().contains(leaked));
            assert!(!second.answer().unwrap().contains(leaked));
        }

        assert_eq!(third.context(), "");
        assert_eq!(third.score(), 0.0);
        assert_eq!(third.answer(), Some("Unrelated question => "));
    }

    #[tokio::test]
    async fn test_concurrent_runs_are_independent() {
        let (pipeline, _, completion) = wired(
            MockVectorIndex::new().with_passages(vec![passage("1", "ctx", 0.7)]),
            "answer",
        );

        let (a, b) = tokio::join!(pipeline.run("alpha"), pipeline.run("beta"));

        assert_eq!(a.unwrap().question().as_str(), "alpha");
        assert_eq!(b.unwrap().question().as_str(), "beta");
        assert_eq!(completion.call_count(), 2);
    }

    #[tokio::test]
    async fn test_query_dimension_matches_ingested_dimension() {
        let (pipeline, index, _) = wired(MockVectorIndex::new(), "answer");

        pipeline.run("q").await.unwrap();

        assert_eq!(index.queried_dimensions(), vec![512]);
    }
}
