// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Persisted passage store and the production vector index.
//!
//! Passages live in `<store dir>/passages.jsonl`, one JSON record per
//! line. The ingestion pipeline appends; the server loads the whole file
//! at startup and builds an in-memory HNSW index over it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::hnsw::PassageIndex;
use super::{Embedder, IndexError, Passage, VectorIndex};

const STORE_FILE: &str = "passages.jsonl";

/// One persisted passage: chunk text, provenance, and its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassageRecord {
    pub id: Uuid,
    pub text: String,
    pub source: String,
    pub chunk: usize,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

impl PassageRecord {
    pub fn new(
        text: impl Into<String>,
        source: impl Into<String>,
        chunk: usize,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            source: source.into(),
            chunk,
            embedding,
            created_at: Utc::now(),
        }
    }
}

/// Append/load access to the on-disk passage file.
pub struct PassageStore {
    dir: PathBuf,
}

impl PassageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_path(&self) -> PathBuf {
        self.dir.join(STORE_FILE)
    }

    /// Load all records. A missing store yields an empty set, not an
    /// error, so a node can start before any ingestion has run.
    pub fn load(&self) -> Result<Vec<PassageRecord>, IndexError> {
        let path = self.file_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&path)?;
        let reader = BufReader::new(file);

        let mut records = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: PassageRecord =
                serde_json::from_str(&line).map_err(|e| IndexError::Corrupt {
                    line: line_no + 1,
                    reason: e.to_string(),
                })?;
            records.push(record);
        }

        Ok(records)
    }

    /// Append records, creating the store directory on first use.
    pub fn append(&self, records: &[PassageRecord]) -> Result<(), IndexError> {
        fs::create_dir_all(&self.dir)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.file_path())?;

        for record in records {
            let line = serde_json::to_string(record).map_err(|e| IndexError::Corrupt {
                line: 0,
                reason: e.to_string(),
            })?;
            writeln!(file, "{}", line)?;
        }

        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Production [`VectorIndex`]: query embedding + HNSW search over the
/// persisted passages.
pub struct HnswVectorStore {
    embedder: Arc<dyn Embedder>,
    index: PassageIndex,
    top_k: usize,
    score_threshold: f32,
}

impl HnswVectorStore {
    /// Load the store at `dir` and build the search index.
    ///
    /// Dimensions are inferred from the first record; records that
    /// disagree fail the load (a corrupt or mixed-model store).
    pub fn open(
        dir: impl Into<PathBuf>,
        embedder: Arc<dyn Embedder>,
        top_k: usize,
        score_threshold: f32,
    ) -> Result<Self, IndexError> {
        let store = PassageStore::new(dir);
        let records = store.load()?;

        let dimensions = records.first().map(|r| r.embedding.len()).unwrap_or(0);
        let index = PassageIndex::build(records, dimensions)?;

        info!(
            passages = index.passage_count(),
            dimensions, top_k, "vector store loaded"
        );

        Ok(Self {
            embedder,
            index,
            top_k,
            score_threshold,
        })
    }

    pub fn passage_count(&self) -> usize {
        self.index.passage_count()
    }
}

#[async_trait]
impl VectorIndex for HnswVectorStore {
    async fn similarity_search(&self, query: &str) -> Result<Vec<Passage>, IndexError> {
        if self.index.passage_count() == 0 {
            return Ok(vec![]);
        }

        let embeddings = self.embedder.embed(&[query.to_string()]).await?;
        let query_vector = embeddings.into_iter().next().ok_or_else(|| {
            IndexError::Embedding(super::EmbedError::MalformedResponse(
                "embedder returned no vector".to_string(),
            ))
        })?;

        self.index
            .search(&query_vector, self.top_k, self.score_threshold)
    }
}
