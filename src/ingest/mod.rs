// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Document ingestion pipeline.
//!
//! A straight-line batch transform: list the source directory, extract
//! text, chunk, embed, append the records to the vector store, then move
//! the file to the processed directory. A file that fails at any step is
//! logged and left in place; the batch continues with the next file.
//! There is no concurrency here and none is needed.

pub mod chunker;

pub use chunker::TextChunker;

use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::config::Settings;
use crate::vector::{Embedder, PassageRecord, PassageStore};

/// Chunking constants for ingested documents.
const CHUNK_SIZE: usize = 1000;
const CHUNK_OVERLAP: usize = 200;

/// File extensions we can extract text from.
const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "text"];

/// Errors that abort the whole batch (per-file failures never do).
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot list source directory {path}: {source}")]
    SourceDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of one ingestion run.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Files embedded, persisted, and moved.
    pub processed: usize,
    /// Files left in place (unsupported format or per-file failure).
    pub skipped: usize,
    /// Total passages appended to the store.
    pub passages: usize,
}

/// Run one ingestion batch over `rag.source_file_location`.
pub async fn process_files(
    settings: &Settings,
    embedder: Arc<dyn Embedder>,
) -> Result<IngestReport, IngestError> {
    let source_dir = &settings.rag.source_file_location;
    let entries = fs::read_dir(source_dir).map_err(|e| IngestError::SourceDir {
        path: source_dir.display().to_string(),
        source: e,
    })?;

    let store = PassageStore::new(&settings.rag.vector_store_path);
    let chunker = TextChunker::new(CHUNK_SIZE, CHUNK_OVERLAP);

    info!(
        source = %source_dir.display(),
        embedding_model = embedder.name(),
        device = %settings.llm.device,
        batch_size = settings.llm.batch_size,
        "starting ingestion batch"
    );

    let mut report = IngestReport::default();

    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                error!("Unreadable directory entry: {}", e);
                report.skipped += 1;
                continue;
            }
        };

        if !path.is_file() {
            continue;
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        info!("{}", file_name);

        match process_one(&path, &file_name, &chunker, &store, &embedder, settings).await {
            Ok(count) => {
                report.processed += 1;
                report.passages += count;
                info!("{} processed.", file_name);
            }
            Err(e) => {
                error!("{}", e);
                report.skipped += 1;
            }
        }
    }

    info!(
        processed = report.processed,
        skipped = report.skipped,
        passages = report.passages,
        "ingestion batch finished"
    );

    Ok(report)
}

/// Ingest a single file end to end; any error leaves it unmoved.
async fn process_one(
    path: &Path,
    file_name: &str,
    chunker: &TextChunker,
    store: &PassageStore,
    embedder: &Arc<dyn Embedder>,
    settings: &Settings,
) -> anyhow::Result<usize> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        anyhow::bail!("unsupported file format: {}", file_name);
    }

    let text = fs::read_to_string(path)?;
    let chunks = chunker.split(&text);
    if chunks.is_empty() {
        anyhow::bail!("no extractable text in {}", file_name);
    }

    let batch_size = settings.llm.batch_size.max(1);
    let mut records = Vec::with_capacity(chunks.len());

    for (batch_index, batch) in chunks.chunks(batch_size).enumerate() {
        let embeddings = embedder.embed(batch).await?;
        for (offset, (chunk_text, embedding)) in batch.iter().zip(embeddings).enumerate() {
            let chunk_index = batch_index * batch_size + offset;
            records.push(PassageRecord::new(
                chunk_text.clone(),
                file_name,
                chunk_index,
                embedding,
            ));
        }
    }

    let count = records.len();
    store.append(&records)?;

    move_to_processed(path, file_name, &settings.rag.processed_file_location)?;

    Ok(count)
}

/// Move a fully ingested file; falls back to copy+delete when the
/// processed directory is on a different filesystem.
fn move_to_processed(path: &Path, file_name: &str, processed_dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(processed_dir)?;
    let dest = processed_dir.join(file_name);

    if fs::rename(path, &dest).is_err() {
        fs::copy(path, &dest)?;
        fs::remove_file(path)?;
    }

    Ok(())
}
