use std::sync::Arc;
use tracing::debug;

use crate::llm::{ChatError, ChatModel, Message};
use crate::session::ChatHistory;
use crate::vector::Passage;

/// System instruction for answering. The retrieved context is substituted
/// for `{context}`; the three-sentence cap is a prompt-level constraint,
/// not mechanically enforced.
const QA_SYSTEM_PROMPT: &str = "You are an assistant for question-answering tasks. \
You are named 'NydasBot'. Use the following pieces of retrieved context to \
answer the question. If you don't know the answer, just say that you don't know. \
Use three sentences maximum and keep the answer concise.\n\n{context}";

/// Composes a grounded answer from history, input, and retrieved passages.
pub struct AnswerComposer {
    model: Arc<dyn ChatModel>,
}

impl AnswerComposer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// One completion round-trip over: persona system prompt with the
    /// concatenated passage texts, the full history as prior turns, and
    /// the user's original input as the final turn.
    pub async fn compose(
        &self,
        history: &ChatHistory,
        input: &str,
        passages: &[Passage],
    ) -> Result<String, ChatError> {
        let context = passages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let system = QA_SYSTEM_PROMPT.replace("{context}", &context);

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(system));
        messages.extend_from_slice(history.messages());
        messages.push(Message::human(input));

        debug!(
            passages = passages.len(),
            history_len = history.len(),
            "composing answer"
        );

        self.model.complete(&messages).await
    }
}
