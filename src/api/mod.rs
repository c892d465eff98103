// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! WebSocket API: wire format and connection server.

pub mod messages;
pub mod server;

pub use messages::{ChatRequest, ChatResponse};
pub use server::{ChatServer, ServerConfig, ServerHandle};
