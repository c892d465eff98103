use thiserror::Error;

use crate::llm::ChatError;
use crate::vector::IndexError;

/// A conversational turn failed before producing an answer.
///
/// Whatever the stage, the session history is left untouched; the caller
/// reports the error and the client may simply resend the message.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("query rewrite failed: {0}")]
    Rewrite(#[source] ChatError),

    #[error("retrieval failed: {0}")]
    Retrieval(#[from] IndexError),

    #[error("answer composition failed: {0}")]
    Compose(#[source] ChatError),
}
