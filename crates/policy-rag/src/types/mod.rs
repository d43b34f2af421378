//! Core data types

pub mod document;
pub mod request;
pub mod response;

pub use document::{Chunk, Document, ScoredRecord, StoredRecord};
pub use request::AskRequest;
pub use response::{AskResponse, Citation, ChunkView, IngestResponse, MetricsResponse};
