//! Grounded QA
//!
//! Retrieval-augmented question answering over a document corpus:
//! - Questions are embedded and matched against a vector index (Pinecone or in-memory)
//! - The best passages become the only context the completion model may use
//! - Documents are chunked, embedded with the same model and upserted offline

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::{CompletionProvider, EmbeddingProvider, VectorIndex};
use infrastructure::{
    completion::CompletionProviderFactory,
    embedding::EmbeddingProviderFactory,
    ingestion::IngestionPipeline,
    pipeline::{GroundedGenerator, RagPipeline, VectorRetriever},
    vector_index::VectorIndexFactory,
};
use tracing::info;

/// Build the query pipeline from configuration, reading credentials from the environment
pub async fn build_pipeline(
    config: &AppConfig,
) -> anyhow::Result<(RagPipeline, Arc<dyn VectorIndex>)> {
    let embedding = EmbeddingProviderFactory::create(&config.embedding)?;
    let completion = CompletionProviderFactory::create(&config.completion)?;

    build_pipeline_with(config, embedding, completion).await
}

/// Build the query pipeline around already-constructed providers.
///
/// Fails when the index stores vectors of a different dimensionality than
/// the configured embedder produces.
pub async fn build_pipeline_with(
    config: &AppConfig,
    embedding: Arc<dyn EmbeddingProvider>,
    completion: Arc<dyn CompletionProvider>,
) -> anyhow::Result<(RagPipeline, Arc<dyn VectorIndex>)> {
    config.validate()?;

    let embedder = EmbeddingProviderFactory::create_embedder(&config.embedding, embedding)?;
    let index = VectorIndexFactory::create(&config.index, config.embedding.dimensions).await?;

    let retriever = VectorRetriever::new(
        embedder,
        index.clone(),
        config.pipeline.retriever_config(),
    );
    retriever.verify_index_dimension().await?;

    let generator = GroundedGenerator::new(
        completion,
        config
            .completion
            .generator_config(config.pipeline.generation_timeout_secs),
    );

    info!(
        index = index.index_name(),
        index_provider = index.provider_type(),
        embedding_model = %config.embedding.model,
        dimensions = config.embedding.dimensions,
        completion_model = %config.completion.model,
        top_k = config.pipeline.top_k,
        "Pipeline initialized"
    );

    Ok((
        RagPipeline::new(Arc::new(retriever), Arc::new(generator)),
        index,
    ))
}

/// Create the HTTP application state
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let (pipeline, index) = build_pipeline(config).await?;

    Ok(AppState::new(Arc::new(pipeline), index)
        .with_relevance_threshold(config.pipeline.relevance_threshold))
}

/// Build the offline ingestion pipeline with the same embedder settings as querying
pub async fn build_ingestion_pipeline(config: &AppConfig) -> anyhow::Result<IngestionPipeline> {
    config.validate()?;

    let embedding = EmbeddingProviderFactory::create(&config.embedding)?;
    let embedder = EmbeddingProviderFactory::create_embedder(&config.embedding, embedding)?;
    let index = VectorIndexFactory::create(&config.index, config.embedding.dimensions).await?;

    Ok(IngestionPipeline::new(
        embedder,
        index,
        config.ingestion.ingestion_config(),
    ))
}
