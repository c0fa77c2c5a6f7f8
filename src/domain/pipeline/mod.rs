//! Retrieval-augmented generation pipeline domain types
//!
//! A run moves a [`PipelineState`] through two stages: a [`Retriever`]
//! assembles grounding context, then a [`Generator`] answers from it.

mod config;
mod error;
mod prompt;
mod stage;
mod state;

pub use config::{GeneratorConfig, RetrieverConfig, DEFAULT_CONTEXT_SEPARATOR};
pub use error::PipelineError;
pub use prompt::{grounded_prompt, GROUNDING_INSTRUCTION, REFUSAL_INSTRUCTION};
pub use stage::{Generator, Retriever};
pub use state::{Generation, PipelineStage, PipelineState, Question, Retrieval};

#[cfg(test)]
pub use stage::mock::{EchoGenerator, MockRetriever};
