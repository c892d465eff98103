use serde::{Deserialize, Serialize};

/// One inbound request: a user utterance for a session.
///
/// `session_id` is optional; requests without one all share the default
/// session (see [`crate::session::DEFAULT_SESSION_ID`]).
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub input: String,
}

/// One outbound response: exactly one of `answer` or `error`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ChatResponse {
    Answer { answer: String },
    Error { error: String },
}

impl ChatResponse {
    pub fn answer(answer: impl Into<String>) -> Self {
        ChatResponse::Answer {
            answer: answer.into(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        ChatResponse::Error {
            error: error.into(),
        }
    }
}
