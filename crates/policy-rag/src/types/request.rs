//! Request types and validation

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum accepted query length in characters
pub const MAX_QUERY_CHARS: usize = 1000;

/// Accepted range for the number of chunks to retrieve
pub const K_MIN: usize = 1;
pub const K_MAX: usize = 20;

/// A question for the RAG service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    /// The question to ask
    pub query: String,
    /// Number of chunks to retrieve; service default applies when omitted
    #[serde(default)]
    pub k: Option<usize>,
}

impl AskRequest {
    /// Validate the request, returning the trimmed query and effective k.
    /// Rejected requests never reach the engine.
    pub fn validate(&self, default_k: usize) -> Result<(String, usize)> {
        let query = self.query.trim();
        if query.is_empty() {
            return Err(Error::validation("Query cannot be empty"));
        }
        if self.query.chars().count() > MAX_QUERY_CHARS {
            return Err(Error::validation(format!(
                "Query must be at most {} characters",
                MAX_QUERY_CHARS
            )));
        }

        let k = self.k.unwrap_or(default_k);
        if !(K_MIN..=K_MAX).contains(&k) {
            return Err(Error::validation(format!(
                "k must be between {} and {}",
                K_MIN, K_MAX
            )));
        }

        Ok((query.to_string(), k))
    }
}
