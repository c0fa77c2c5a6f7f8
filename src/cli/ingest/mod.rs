//! Ingest command - loads a text document into the vector index

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::infrastructure::logging::init_logging;

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Path to a UTF-8 text file
    pub path: PathBuf,

    /// Source name used in record ids; defaults to the file name
    #[arg(long)]
    pub source: Option<String>,

    /// Chunks embedded and upserted per request
    #[arg(long)]
    pub batch_size: Option<usize>,
}

pub async fn run(args: IngestArgs) -> anyhow::Result<()> {
    let mut config = super::load_config()?;
    init_logging(&config.logging);

    if let Some(batch_size) = args.batch_size {
        config.ingestion.batch_size = batch_size;
    }

    let pipeline = crate::build_ingestion_pipeline(&config).await?;
    let report = pipeline
        .ingest_file(&args.path, args.source.as_deref())
        .await?;

    info!(
        source = %report.source,
        chunks = report.chunks,
        upserted = report.upserted,
        "Document ingested"
    );
    println!(
        "Ingested '{}': {} chunks, {} vectors upserted in {} batches",
        report.source, report.chunks, report.upserted, report.batches
    );

    Ok(())
}
