//! CLI module for Grounded QA
//!
//! Subcommands:
//! - `serve`: HTTP API server
//! - `ask`: answer one question and print the retrieved context
//! - `ingest`: chunk, embed and upsert a text document

pub mod ask;
pub mod ingest;
pub mod serve;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;

/// Grounded question answering over a document corpus
#[derive(Parser)]
#[command(name = "grounded-qa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Answer a single question from the command line
    Ask(ask::AskArgs),

    /// Ingest a plain-text document into the vector index
    Ingest(ingest::IngestArgs),
}

/// Load `.env`, then layered configuration
fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate()?;

    Ok(config)
}
