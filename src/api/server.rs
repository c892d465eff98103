// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! WebSocket connection server.
//!
//! Each accepted connection runs in its own task; within one connection
//! messages are processed strictly in arrival order, one fully handled
//! (decode, engine call, response send) before the next is read. A failed
//! message produces an `{"error": ...}` response on the same connection
//! and never closes it; only the client ends a conversation stream.

use anyhow::Result;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use super::messages::{ChatRequest, ChatResponse};
use crate::rag::ConversationEngine;
use crate::session::DEFAULT_SESSION_ID;

pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8765,
        }
    }
}

/// WebSocket front door for the conversation engine.
pub struct ChatServer {
    config: ServerConfig,
    engine: Arc<ConversationEngine>,
}

impl ChatServer {
    pub fn new(config: ServerConfig, engine: Arc<ConversationEngine>) -> Self {
        Self { config, engine }
    }

    /// Bind and start accepting connections. Returns a handle carrying
    /// the bound address (port 0 resolves here) and a shutdown trigger.
    pub async fn start(&self) -> Result<ServerHandle> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;
        info!("WebSocket server listening on {}", local_addr);

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let engine = self.engine.clone();

        let accept_handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    accept_result = listener.accept() => {
                        match accept_result {
                            Ok((stream, peer)) => {
                                tokio::spawn(handle_connection(stream, peer, engine.clone()));
                            }
                            Err(e) => {
                                error!("Failed to accept connection: {}", e);
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!("Shutting down WebSocket server");
                        break;
                    }
                }
            }
        });

        Ok(ServerHandle {
            local_addr,
            shutdown_tx,
            accept_handle: Some(accept_handle),
        })
    }
}

pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    accept_handle: Option<tokio::task::JoinHandle<()>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting new connections. Established connections run until
    /// their clients disconnect.
    pub async fn shutdown(mut self) -> Result<()> {
        self.shutdown_tx.send(()).await.ok();
        if let Some(handle) = self.accept_handle.take() {
            handle.await.ok();
        }
        info!("WebSocket server shutdown complete");
        Ok(())
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, engine: Arc<ConversationEngine>) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            error!("WebSocket handshake failed for {}: {}", peer, e);
            return;
        }
    };

    let conn_id = format!("conn-{}", uuid::Uuid::new_v4());
    info!("Connection {} established from {}", conn_id, peer);

    let (mut tx, mut rx) = ws_stream.split();
    while let Some(msg) = rx.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let response = dispatch(&engine, &text).await;
                let encoded = serde_json::to_string(&response).unwrap_or_else(|e| {
                    error!("Failed to encode response: {}", e);
                    r#"{"error":"internal encoding failure"}"#.to_string()
                });

                if let Err(e) = tx.send(Message::Text(encoded)).await {
                    warn!("Failed to send on {}: {}", conn_id, e);
                    break;
                }
            }
            Ok(Message::Ping(data)) => {
                tx.send(Message::Pong(data)).await.ok();
            }
            Ok(Message::Binary(data)) => {
                debug!("Ignoring binary frame on {} ({} bytes)", conn_id, data.len());
            }
            Ok(Message::Close(_)) => {
                debug!("Connection {} closing", conn_id);
                break;
            }
            Err(e) => {
                warn!("Error receiving on {}: {}", conn_id, e);
                break;
            }
            _ => {}
        }
    }

    info!("Connection {} closed", conn_id);
}

/// Decode one request and run it through the engine.
///
/// Every failure mode collapses into the error variant of the response;
/// nothing here unwinds into the connection loop.
async fn dispatch(engine: &ConversationEngine, text: &str) -> ChatResponse {
    let request: ChatRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(e) => {
            warn!("Undecodable request: {}", e);
            return ChatResponse::error(format!("invalid request: {}", e));
        }
    };

    let session_id = request.session_id.as_deref().unwrap_or(DEFAULT_SESSION_ID);

    match engine.answer(session_id, &request.input).await {
        Ok(answer) => ChatResponse::answer(answer),
        Err(e) => {
            error!("An error occurred: {}", e);
            ChatResponse::error(e.to_string())
        }
    }
}
