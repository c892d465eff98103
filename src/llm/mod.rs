// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Chat model abstraction and the Ollama-backed production client.
//!
//! The conversational pipeline talks to the language model exclusively
//! through the [`ChatModel`] trait so that tests can substitute canned
//! completions without a running backend.

pub mod ollama;
pub mod types;

pub use ollama::OllamaChat;
pub use types::{ChatError, Message, Role};

use async_trait::async_trait;

/// A chat completion backend.
///
/// One call is one round-trip: the full role-tagged message sequence goes
/// in, a single completion string comes out. Implementations are shared
/// across all sessions and must be stateless with respect to callers.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Produce a completion for the given message sequence.
    async fn complete(&self, messages: &[Message]) -> Result<String, ChatError>;

    /// Backend identifier for logging.
    fn name(&self) -> &str;
}
