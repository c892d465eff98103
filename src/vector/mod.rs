// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vector index over ingested document passages.
//!
//! The retrieval side of the pipeline sees only the [`VectorIndex`] trait:
//! a query string in, ranked [`Passage`]s out. The production
//! implementation ([`store::HnswVectorStore`]) embeds the query and runs
//! an HNSW cosine-similarity search over passages persisted by the
//! ingestion pipeline.

pub mod embeddings;
pub mod hnsw;
pub mod store;

pub use embeddings::{EmbedError, Embedder, OllamaEmbedder};
pub use hnsw::PassageIndex;
pub use store::{HnswVectorStore, PassageRecord, PassageStore};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A retrieved unit of text plus provenance, used as grounding context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    /// Chunk text.
    pub text: String,
    /// Originating document (file name).
    pub source: String,
    /// Position of the chunk within the document.
    pub chunk: usize,
    /// Cosine similarity to the query (0.0 to 1.0).
    pub score: f32,
}

/// Errors from the vector index or its persistence layer.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Store directory or file could not be read or written.
    #[error("vector store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted record did not parse.
    #[error("corrupt vector store record at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },

    /// A stored or queried vector has the wrong dimension count.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A vector contains NaN or infinity.
    #[error("non-finite value in {context} vector")]
    NonFinite { context: &'static str },

    /// Embedding the query failed.
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbedError),
}

/// Similarity search over stored passages.
///
/// `k` and the score threshold are index-side configuration; callers get
/// whatever the index considers its top result set.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn similarity_search(&self, query: &str) -> Result<Vec<Passage>, IndexError>;
}
