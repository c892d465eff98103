use std::sync::Arc;
use tracing::debug;

use crate::llm::{ChatError, ChatModel, Message};
use crate::session::ChatHistory;

/// System instruction for the rewrite round-trip: reformulate only, never
/// answer, and pass self-contained questions through unchanged.
const CONTEXTUALIZE_SYSTEM_PROMPT: &str = "Given a chat history and the latest user question \
which might reference context in the chat history, formulate a standalone question \
which can be understood without the chat history. Do NOT answer the question, \
just reformulate it if needed and otherwise return it as is.";

/// Rewrites a context-dependent follow-up into a standalone query.
pub struct QueryRewriter {
    model: Arc<dyn ChatModel>,
}

impl QueryRewriter {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Produce a query understandable without the history.
    ///
    /// An empty history means the input cannot reference prior turns, so
    /// it is returned as-is without a model round-trip. Otherwise this is
    /// a single completion call; the history itself is never mutated.
    pub async fn rewrite(
        &self,
        history: &ChatHistory,
        input: &str,
    ) -> Result<String, ChatError> {
        if history.is_empty() {
            return Ok(input.to_string());
        }

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(CONTEXTUALIZE_SYSTEM_PROMPT));
        messages.extend_from_slice(history.messages());
        messages.push(Message::human(input));

        let rewritten = self.model.complete(&messages).await?;
        let rewritten = rewritten.trim().to_string();

        debug!(original = input, rewritten = %rewritten, "query rewritten");

        Ok(rewritten)
    }
}
