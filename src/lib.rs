// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod ingest;
pub mod llm;
pub mod rag;
pub mod session;
pub mod vector;

// Re-export the types most callers wire together
pub use api::{ChatServer, ServerConfig};
pub use config::{ConfigError, Settings};
pub use llm::{ChatModel, Message, OllamaChat, Role};
pub use rag::{ConversationEngine, EngineError};
pub use session::{ChatHistory, SessionStore, SessionStoreConfig, DEFAULT_SESSION_ID};
pub use vector::{Embedder, HnswVectorStore, OllamaEmbedder, Passage, VectorIndex};
