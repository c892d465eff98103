use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Human,
    Assistant,
}

impl Role {
    /// Role string expected by OpenAI/Ollama-style chat APIs.
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Human => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Errors from a chat completion backend.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Backend could not be reached at all.
    #[error("chat backend unreachable: {0}")]
    Unreachable(String),

    /// Backend answered with a non-success status.
    #[error("chat backend returned {status}: {message}")]
    Backend {
        status: u16,
        message: String,
    },

    /// Backend answered 200 but the payload did not parse.
    #[error("malformed completion payload: {0}")]
    MalformedResponse(String),
}
