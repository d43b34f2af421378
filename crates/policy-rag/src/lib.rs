//! policy-rag: retrieval-augmented Q&A over policy and product documents
//!
//! This crate ingests Markdown/text documents, splits them into overlapping
//! chunks, embeds them into vectors, and answers questions by retrieving the
//! most similar chunks and grounding an LLM answer in them, with citations.
//! Both the vector store (in-memory or Qdrant) and the answer generator
//! (deterministic stub or Ollama) are pluggable at construction time.

pub mod config;
pub mod engine;
pub mod error;
pub mod ingestion;
pub mod providers;
pub mod server;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::RagConfig;
pub use engine::RagEngine;
pub use error::{Error, Result};
pub use types::{
    document::{Chunk, Document, StoredRecord},
    request::AskRequest,
    response::{AskResponse, Citation, IngestResponse, MetricsResponse},
};
