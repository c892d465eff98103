//! Per-session conversational state.
//!
//! Sessions are keyed by an opaque client-supplied string. Each session
//! owns one append-only [`ChatHistory`]; the store hands out the same
//! shared handle for a given id for the life of the process.

pub mod history;
pub mod store;

pub use history::ChatHistory;
pub use store::{SessionStore, SessionStoreConfig};

/// Session identifier used when a request carries none.
///
/// All callers that omit `session_id` share this history. Callers that
/// need isolation must always supply their own id.
pub const DEFAULT_SESSION_ID: &str = "default_session";
