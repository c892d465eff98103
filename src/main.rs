// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use nydas_node::{
    api::{ChatServer, ServerConfig},
    config::{self, Settings},
    llm::OllamaChat,
    rag::ConversationEngine,
    session::{SessionStore, SessionStoreConfig},
    vector::{HnswVectorStore, OllamaEmbedder},
};
use std::sync::Arc;
use tokio::signal;
use tracing::info;

#[derive(Parser)]
#[command(name = "nydas-node", about = "Conversational RAG WebSocket server")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "parameters.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::from_file(&args.config)?;
    config::init_tracing(&settings.general.logging_level);

    info!(
        model = %settings.llm.model,
        embedding_model = %settings.llm.embedding_model,
        "starting nydas-node"
    );

    let chat = Arc::new(OllamaChat::new(
        settings.llm.base_url.clone(),
        settings.llm.model.clone(),
    ));
    let embedder = Arc::new(OllamaEmbedder::new(
        settings.llm.base_url.clone(),
        settings.llm.embedding_model.clone(),
    ));

    let index = Arc::new(HnswVectorStore::open(
        &settings.rag.vector_store_path,
        embedder,
        settings.rag.top_k,
        settings.rag.score_threshold,
    )?);

    let sessions = Arc::new(SessionStore::new(SessionStoreConfig {
        max_sessions: settings.session.max_sessions,
    }));

    let engine = Arc::new(ConversationEngine::new(chat, index, sessions));

    let server = ChatServer::new(
        ServerConfig {
            host: settings.general.host.clone(),
            port: settings.general.port,
        },
        engine,
    );
    let handle = server.start().await?;

    info!("nydas-node ready on ws://{}", handle.local_addr());

    signal::ctrl_c().await?;
    info!("shutdown signal received");
    handle.shutdown().await?;

    Ok(())
}
