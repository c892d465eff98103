// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Ingestion batch job: embeds documents from the source directory into
//! the vector store and moves them to the processed directory.

use anyhow::Result;
use clap::Parser;
use nydas_node::{
    config::{self, Settings},
    ingest,
    vector::OllamaEmbedder,
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "ingest", about = "Embed source documents into the vector store")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "parameters.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::from_file(&args.config)?;
    config::init_tracing(&settings.general.logging_level);

    let embedder = Arc::new(OllamaEmbedder::new(
        settings.llm.base_url.clone(),
        settings.llm.embedding_model.clone(),
    ));

    let report = ingest::process_files(&settings, embedder).await?;

    info!(
        processed = report.processed,
        skipped = report.skipped,
        passages = report.passages,
        "ingestion complete"
    );

    Ok(())
}
