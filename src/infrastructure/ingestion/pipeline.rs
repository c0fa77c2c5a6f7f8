//! Ingestion pipeline service

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, instrument};

use super::RecursiveChunker;
use crate::domain::ingestion::{Chunk, ChunkingStrategy, IngestionConfig, IngestionReport};
use crate::domain::{DomainError, IndexRecord, TextEmbedder, VectorIndex};
use crate::infrastructure::observability::record_ingested_chunks;

/// Offline pipeline that turns documents into index records.
///
/// Uses the same embedder as query-time retrieval, so stored vectors and
/// question vectors share one dimensionality.
#[derive(Debug)]
pub struct IngestionPipeline {
    embedder: Arc<dyn TextEmbedder>,
    index: Arc<dyn VectorIndex>,
    chunker: Arc<dyn ChunkingStrategy>,
    config: IngestionConfig,
}

impl IngestionPipeline {
    pub fn new(
        embedder: Arc<dyn TextEmbedder>,
        index: Arc<dyn VectorIndex>,
        config: IngestionConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            chunker: Arc::new(RecursiveChunker::new()),
            config,
        }
    }

    pub fn with_chunker(mut self, chunker: Arc<dyn ChunkingStrategy>) -> Self {
        self.chunker = chunker;
        self
    }

    /// Read a UTF-8 text file and ingest it. `source` defaults to the file stem.
    pub async fn ingest_file(
        &self,
        path: &Path,
        source: Option<&str>,
    ) -> Result<IngestionReport, DomainError> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainError::validation(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let source = match source {
            Some(source) => source.to_string(),
            None => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string()),
        };

        self.ingest_text(&source, &text).await
    }

    /// Chunk, embed and upsert one document
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn ingest_text(
        &self,
        source: &str,
        text: &str,
    ) -> Result<IngestionReport, DomainError> {
        self.config.validate()?;

        if source.trim().is_empty() {
            return Err(DomainError::validation("source must not be empty"));
        }

        self.check_dimension().await?;

        let chunks = self.chunker.chunk(text, &self.config.chunking)?;
        let mut report = IngestionReport::new(source);
        report.chunks = chunks.len();

        if chunks.is_empty() {
            info!(source, "No content to ingest");
            return Ok(report);
        }

        for batch in chunks.chunks(self.config.batch_size) {
            let upserted = self.ingest_batch(source, batch).await?;

            report.upserted += upserted;
            report.batches += 1;

            debug!(
                source,
                batch = report.batches,
                upserted,
                "Upserted ingestion batch"
            );
        }

        record_ingested_chunks(source, report.upserted);

        info!(
            source,
            chunks = report.chunks,
            upserted = report.upserted,
            batches = report.batches,
            index = self.index.index_name(),
            "Ingestion completed"
        );

        Ok(report)
    }

    async fn ingest_batch(&self, source: &str, batch: &[Chunk]) -> Result<usize, DomainError> {
        let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        if vectors.len() != batch.len() {
            return Err(DomainError::provider(
                "embedding",
                format!(
                    "expected {} vectors, received {}",
                    batch.len(),
                    vectors.len()
                ),
            ));
        }

        let records = batch
            .iter()
            .zip(vectors)
            .map(|(chunk, values)| to_record(source, chunk, values))
            .collect();

        self.index.upsert(records).await
    }

    async fn check_dimension(&self) -> Result<(), DomainError> {
        match self.index.dimension().await? {
            Some(stored) if stored != self.embedder.dimensions() => {
                Err(DomainError::configuration(format!(
                    "index '{}' stores {}-dimensional vectors but the embedder produces {}",
                    self.index.index_name(),
                    stored,
                    self.embedder.dimensions()
                )))
            }
            _ => Ok(()),
        }
    }
}

fn to_record(source: &str, chunk: &Chunk, values: Vec<f32>) -> IndexRecord {
    let mut record = IndexRecord::new(
        format!("{}_chunk_{}", source, chunk.index()),
        values,
        chunk.content.clone(),
    )
    .with_metadata("source", json!(source));

    record.metadata.extend(chunk.metadata.to_json_map());
    record
}
