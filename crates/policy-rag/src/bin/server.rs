//! RAG server binary
//!
//! Run with: cargo run -p policy-rag --bin policy-rag-server

use policy_rag::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "policy_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RagConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Data directory: {}", config.corpus.data_dir.display());
    tracing::info!("  - Embedding model: {} ({} dims)", config.embeddings.model, config.embeddings.dimensions);
    tracing::info!("  - LLM provider: {:?} ({})", config.llm.provider, config.llm.generate_model);
    tracing::info!("  - Store backend: {:?}", config.store.backend);
    tracing::info!(
        "  - Chunking: {} tokens, {} overlap",
        config.corpus.chunk_size,
        config.corpus.chunk_overlap
    );

    // Surface a missing Ollama early; the embedder will still acquire lazily
    let client = reqwest::Client::new();
    match client
        .get(format!("{}/api/tags", config.llm.base_url))
        .send()
        .await
    {
        Ok(resp) if resp.status().is_success() => {
            tracing::info!("Ollama is running at {}", config.llm.base_url);
        }
        _ => {
            tracing::warn!("Ollama not available at {}", config.llm.base_url);
            tracing::warn!("Embedding requests will fail until it is up:");
            tracing::warn!("  1. Start: ollama serve");
            tracing::warn!("  2. Pull the embedding model: ollama pull {}", config.embeddings.model);
        }
    }

    let server = RagServer::new(config).await;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/ingest  - Index the document corpus");
    println!("  POST /api/ask     - Ask a question");
    println!("  GET  /api/metrics - Service metrics");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
