// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Ollama chat completion client.
//!
//! Talks to the `/api/chat` endpoint of an Ollama-compatible server with
//! `stream: false` and temperature pinned to 0 so answers stay
//! deterministic for a given context.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::types::{ChatError, Message};
use super::ChatModel;

const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Chat client for an Ollama-compatible backend.
pub struct OllamaChat {
    base_url: String,
    model: String,
    client: Client,
}

impl OllamaChat {
    /// Create a client for `model` served at `base_url`
    /// (e.g. `http://localhost:11434`).
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
}

#[async_trait]
impl ChatModel for OllamaChat {
    async fn complete(&self, messages: &[Message]) -> Result<String, ChatError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = ChatRequestBody {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_wire_str(),
                    content: &m.content,
                })
                .collect(),
            stream: false,
            options: ChatOptions { temperature: 0.0 },
        };

        debug!(model = %self.model, messages = messages.len(), "chat completion request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ChatError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let data: ChatResponseBody = response
            .json()
            .await
            .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;

        Ok(data.message.content)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponseBody {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}
