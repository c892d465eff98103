// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::sync::Arc;
use tracing::{debug, info};

use super::{AnswerComposer, EngineError, QueryRewriter, Retriever};
use crate::llm::ChatModel;
use crate::session::SessionStore;
use crate::vector::VectorIndex;

/// Orchestrates one conversational turn: rewrite -> retrieve -> compose.
///
/// Collaborators are shared stateless services injected once at
/// construction; per-session state lives entirely in the [`SessionStore`].
pub struct ConversationEngine {
    rewriter: QueryRewriter,
    retriever: Retriever,
    composer: AnswerComposer,
    sessions: Arc<SessionStore>,
}

impl ConversationEngine {
    pub fn new(
        model: Arc<dyn ChatModel>,
        index: Arc<dyn VectorIndex>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            rewriter: QueryRewriter::new(model.clone()),
            retriever: Retriever::new(index),
            composer: AnswerComposer::new(model),
            sessions,
        }
    }

    /// Answer one user turn for the given session.
    ///
    /// Retrieval uses the rewritten query while composition sees the
    /// original input as the final turn: the literal user wording belongs
    /// in the conversation, the disambiguated form is only for search.
    ///
    /// The session's history mutex is held for the whole turn, so
    /// concurrent turns on one session serialize while other sessions
    /// proceed untouched. The (human, assistant) pair is appended only
    /// after composition succeeds; any failure aborts the turn with the
    /// history unchanged.
    pub async fn answer(&self, session_id: &str, input: &str) -> Result<String, EngineError> {
        let history = self.sessions.get_or_create(session_id).await;
        let mut history = history.lock().await;

        debug!(session_id, turns = history.turn_count(), "handling turn");

        let rewritten = self
            .rewriter
            .rewrite(&history, input)
            .await
            .map_err(EngineError::Rewrite)?;

        let passages = self.retriever.retrieve(&rewritten).await?;

        let answer = self
            .composer
            .compose(&history, input, &passages)
            .await
            .map_err(EngineError::Compose)?;

        history.push_turn(input, answer.as_str());

        info!(
            session_id,
            passages = passages.len(),
            turns = history.turn_count(),
            "turn completed"
        );

        Ok(answer)
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }
}
