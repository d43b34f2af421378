//! Provider traits and implementations for embeddings, vector storage,
//! and answer generation

pub mod embedding;
pub mod llm;
pub mod memory;
pub mod ollama;
pub mod qdrant;
pub mod stub;
pub mod vector_store;

use std::sync::Arc;

use crate::config::{GeneratorBackend, RagConfig, StoreBackend};

pub use embedding::Embedder;
pub use llm::Generator;
pub use vector_store::VectorStore;

use memory::InMemoryStore;
use ollama::{OllamaClient, OllamaEmbedder, OllamaGenerator};
use qdrant::QdrantStore;
use stub::StubGenerator;

/// Select the vector store backend. Connection failure to the external
/// service falls back to the in-memory store; the fallback is an explicit
/// strategy here, never a silently swallowed error inside a store.
pub async fn select_vector_store(config: &RagConfig) -> Arc<dyn VectorStore> {
    match config.store.backend {
        StoreBackend::Memory => Arc::new(InMemoryStore::new()),
        StoreBackend::Qdrant => {
            match QdrantStore::connect(&config.store, config.embeddings.dimensions).await {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    tracing::warn!(
                        "Qdrant unreachable at {} ({}), falling back to in-memory store",
                        config.store.url,
                        e
                    );
                    Arc::new(InMemoryStore::new())
                }
            }
        }
    }
}

/// Select the answer generator backend
pub fn select_generator(config: &RagConfig) -> Arc<dyn Generator> {
    match config.llm.provider {
        GeneratorBackend::Stub => Arc::new(StubGenerator::new()),
        GeneratorBackend::Ollama => {
            let client = Arc::new(OllamaClient::new(&config.llm));
            Arc::new(OllamaGenerator::new(client, &config.llm))
        }
    }
}

/// Build the Ollama-backed embedder
pub fn build_embedder(config: &RagConfig) -> Arc<dyn Embedder> {
    let client = Arc::new(OllamaClient::new(&config.llm));
    Arc::new(OllamaEmbedder::new(client, &config.embeddings))
}
