//! Configuration for the RAG service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Document corpus and chunking configuration
    #[serde(default)]
    pub corpus: CorpusConfig,
    /// Embedding configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Vector store configuration
    #[serde(default)]
    pub store: StoreConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Load configuration from `POLICY_RAG_CONFIG` if set, defaults otherwise.
    /// A handful of operational knobs can be overridden via environment
    /// variables without a config file.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("POLICY_RAG_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(dir) = std::env::var("POLICY_RAG_DATA_DIR") {
            config.corpus.data_dir = PathBuf::from(dir);
        }
        if let Ok(backend) = std::env::var("POLICY_RAG_STORE") {
            config.store.backend = match backend.to_lowercase().as_str() {
                "qdrant" => StoreBackend::Qdrant,
                "memory" => StoreBackend::Memory,
                other => {
                    return Err(Error::Config(format!("Unknown store backend: {}", other)));
                }
            };
        }
        if let Ok(url) = std::env::var("POLICY_RAG_QDRANT_URL") {
            config.store.url = url;
        }
        if let Ok(url) = std::env::var("POLICY_RAG_OLLAMA_URL") {
            config.llm.base_url = url;
        }
        if let Ok(provider) = std::env::var("POLICY_RAG_LLM") {
            config.llm.provider = match provider.to_lowercase().as_str() {
                "ollama" => GeneratorBackend::Ollama,
                "stub" => GeneratorBackend::Stub,
                other => {
                    return Err(Error::Config(format!("Unknown LLM provider: {}", other)));
                }
            };
        }

        Ok(config)
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

/// Document corpus and chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Directory holding the Markdown/text corpus
    pub data_dir: PathBuf,
    /// Chunk size in whitespace tokens
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in tokens (must stay below chunk_size)
    pub chunk_overlap: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            chunk_size: 200,
            chunk_overlap: 40,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding model served by Ollama (all-minilm is 384-dimensional)
    pub model: String,
    /// Embedding dimensions
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "all-minilm".to_string(),
            dimensions: 384,
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Answer generator backend
    #[serde(default)]
    pub provider: GeneratorBackend,
    /// Ollama base URL (used for embeddings in all cases)
    pub base_url: String,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation; kept low so answers stay reproducible
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: GeneratorBackend::default(),
            base_url: "http://localhost:11434".to_string(),
            generate_model: "llama3.2".to_string(),
            temperature: 0.1,
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

/// Answer generator selection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorBackend {
    /// Deterministic offline stub, safe default with no external dependency
    #[default]
    Stub,
    /// Hosted LLM via Ollama
    Ollama,
}

/// Vector store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store backend
    #[serde(default)]
    pub backend: StoreBackend,
    /// Qdrant base URL
    pub url: String,
    /// Qdrant collection name
    pub collection: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: "http://localhost:6333".to_string(),
            collection: "policy_chunks".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Vector store selection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Linear-scan in-memory store, no external dependency
    #[default]
    Memory,
    /// External Qdrant service
    Qdrant,
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Results scoring at or below this cosine similarity are dropped;
    /// this is the out-of-scope cutoff for the whole service.
    pub relevance_threshold: f32,
    /// Default number of chunks to retrieve when the request omits k
    pub default_top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: 0.35,
            default_top_k: 4,
        }
    }
}
