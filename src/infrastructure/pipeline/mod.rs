//! Query-time pipeline: retriever, generator, and orchestrator

mod generator;
mod orchestrator;
mod retriever;

pub use generator::GroundedGenerator;
pub use orchestrator::RagPipeline;
pub use retriever::VectorRetriever;
