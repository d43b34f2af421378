//! Corpus loading and text chunking

pub mod chunker;
pub mod loader;

pub use chunker::{build_chunks_from_docs, chunk_text, doc_hash, point_id};
pub use loader::load_documents;
