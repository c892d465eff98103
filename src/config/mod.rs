// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Static settings loaded once at startup from `parameters.toml`.
//!
//! Both binaries (the server and the ingestion job) share one file.
//! A malformed file or a missing required key is fatal: the process does
//! not start.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub rag: RagSettings,
    #[serde(default)]
    pub session: SessionSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralSettings {
    /// Minimum severity for process logs; RUST_LOG overrides it.
    #[serde(default = "default_logging_level")]
    pub logging_level: String,

    #[serde(default = "default_host")]
    pub host: String,

    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    /// Ollama-compatible endpoint serving both chat and embeddings.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat model identifier.
    pub model: String,

    /// Embedding model identifier.
    pub embedding_model: String,

    /// Embedding resource hint, ingestion path only. The backend picks
    /// the device; the value is surfaced in logs.
    #[serde(default = "default_device")]
    pub device: String,

    /// Embedding batch size, ingestion path only.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RagSettings {
    /// On-disk location of the persisted vector store.
    pub vector_store_path: PathBuf,

    /// Ingestion input directory.
    pub source_file_location: PathBuf,

    /// Where successfully processed files are moved.
    pub processed_file_location: PathBuf,

    /// Similarity search result count.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum similarity score for retrieved passages.
    #[serde(default)]
    pub score_threshold: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionSettings {
    /// LRU cap on live sessions; 0 keeps every session forever.
    #[serde(default)]
    pub max_sessions: usize,
}

impl Settings {
    /// Load and validate settings from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.general.host, self.general.port)
    }
}

/// Initialize process logging. RUST_LOG wins over the configured level.
pub fn init_tracing(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn default_logging_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_batch_size() -> usize {
    32
}

fn default_top_k() -> usize {
    4
}
