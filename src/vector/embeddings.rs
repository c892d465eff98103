// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text embedding client.
//!
//! Embeddings are produced by the same Ollama-compatible backend that
//! serves the chat model, via its `/api/embeddings` endpoint. The trait
//! keeps the index and the ingestion pipeline testable without a running
//! backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Errors from an embedding backend.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embedding backend unreachable: {0}")]
    Unreachable(String),

    #[error("embedding backend returned {status}: {message}")]
    Backend {
        status: u16,
        message: String,
    },

    #[error("malformed embedding payload: {0}")]
    MalformedResponse(String),
}

/// Text-to-vector embedding backend.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, preserving order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Backend identifier for logging.
    fn name(&self) -> &str;
}

/// Embedding client for an Ollama-compatible backend.
pub struct OllamaEmbedder {
    base_url: String,
    model: String,
    client: Client,
}

impl OllamaEmbedder {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
        }
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let url = format!("{}/api/embeddings", self.base_url);
        let body = EmbeddingRequestBody {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbedError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbedError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let data: EmbeddingResponseBody = response
            .json()
            .await
            .map_err(|e| EmbedError::MalformedResponse(e.to_string()))?;

        if data.embedding.is_empty() {
            return Err(EmbedError::MalformedResponse(
                "empty embedding vector".to_string(),
            ));
        }

        Ok(data.embedding)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        debug!(model = %self.model, count = texts.len(), "embedding batch");

        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed_one(text).await?);
        }
        Ok(vectors)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct EmbeddingRequestBody<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponseBody {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_response_deserialization() {
        let json = r#"{"embedding": [0.1, -0.2, 0.3]}"#;
        let response: EmbeddingResponseBody = serde_json::from_str(json).unwrap();
        assert_eq!(response.embedding.len(), 3);
        assert!((response.embedding[1] + 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_embedder_name() {
        let embedder = OllamaEmbedder::new("http://localhost:11434", "nomic-embed-text");
        assert_eq!(embedder.name(), "nomic-embed-text");
    }
}
