//! Token-window chunking and content hashing

use sha2::{Digest, Sha256};

use crate::types::{Chunk, Document};

/// Point ids must stay within Qdrant's unsigned-integer id space; we keep
/// them in the positive signed 63-bit range to be safe across clients.
const POINT_ID_MODULUS: u64 = (1 << 63) - 1;

/// Split text into overlapping windows of up to `chunk_size` whitespace
/// tokens, advancing `chunk_size - overlap` tokens per step so consecutive
/// chunks share `overlap` tokens of context. Every input token lands in at
/// least one chunk. An overlap at or above the chunk size is clamped to
/// `chunk_size - 1` so the sweep always advances.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let overlap = overlap.min(chunk_size - 1);
    let step = chunk_size - overlap;

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < tokens.len() {
        let end = (start + chunk_size).min(tokens.len());
        chunks.push(tokens[start..end].join(" "));
        if end == tokens.len() {
            break;
        }
        start += step;
    }

    chunks
}

/// Deterministic content hash of chunk text (SHA-256, hex)
pub fn doc_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Derive the numeric store identifier from a content hash: the first 16
/// hex characters reduced into the positive 63-bit range. Deterministic, and
/// collision-unlikely at the corpus sizes this service targets.
pub fn point_id(hash: &str) -> u64 {
    let prefix = &hash[..hash.len().min(16)];
    u64::from_str_radix(prefix, 16).unwrap_or(0) % POINT_ID_MODULUS
}

/// Chunk every document in the corpus, carrying title and section through
pub fn build_chunks_from_docs(docs: &[Document], chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for doc in docs {
        for text in chunk_text(&doc.text, chunk_size, overlap) {
            chunks.push(Chunk {
                title: doc.title.clone(),
                section: doc.section.clone(),
                text,
            });
        }
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_token_appears_at_least_once() {
        let text = "a b c d e f g h i j";
        let chunks = chunk_text(text, 4, 1);

        let covered: std::collections::HashSet<&str> = chunks
            .iter()
            .flat_map(|c| c.split_whitespace())
            .collect();
        for token in text.split_whitespace() {
            assert!(covered.contains(token), "missing token {}", token);
        }
    }

    #[test]
    fn consecutive_chunks_share_overlap() {
        let text = "one two three four five six seven eight";
        let chunks = chunk_text(text, 4, 2);

        assert_eq!(chunks[0], "one two three four");
        assert_eq!(chunks[1], "three four five six");
        assert_eq!(chunks[2], "five six seven eight");
    }

    #[test]
    fn chunking_is_deterministic() {
        let text = "the quick brown fox jumps over the lazy dog";
        assert_eq!(chunk_text(text, 3, 1), chunk_text(text, 3, 1));
    }

    #[test]
    fn oversized_overlap_is_clamped_and_terminates() {
        let text = "a b c d e";
        // overlap >= chunk_size would never advance without the clamp
        let chunks = chunk_text(text, 2, 5);
        assert!(!chunks.is_empty());
        assert_eq!(chunks.last().unwrap().split_whitespace().last(), Some("e"));
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_text("", 4, 1).is_empty());
        assert!(chunk_text("   ", 4, 1).is_empty());
        assert!(chunk_text("a b", 0, 0).is_empty());
    }

    #[test]
    fn short_text_yields_single_chunk() {
        let chunks = chunk_text("only three tokens", 10, 2);
        assert_eq!(chunks, vec!["only three tokens".to_string()]);
    }

    #[test]
    fn hash_is_deterministic_and_content_sensitive() {
        assert_eq!(doc_hash("refund window"), doc_hash("refund window"));
        assert_ne!(doc_hash("refund window"), doc_hash("refund windows"));
        assert_eq!(doc_hash("x").len(), 64);
    }

    #[test]
    fn point_id_is_deterministic_and_in_range() {
        let hash = doc_hash("returns policy text");
        let id = point_id(&hash);
        assert_eq!(id, point_id(&hash));
        assert!(id < POINT_ID_MODULUS);
        assert_ne!(point_id(&doc_hash("a")), point_id(&doc_hash("b")));
    }

    #[test]
    fn builds_chunks_for_all_docs() {
        let docs = vec![
            crate::types::Document {
                title: "Returns Policy".to_string(),
                section: Some("Refunds".to_string()),
                text: "a b c d e f".to_string(),
            },
            crate::types::Document {
                title: "Shipping".to_string(),
                section: None,
                text: "g h".to_string(),
            },
        ];

        let chunks = build_chunks_from_docs(&docs, 4, 2);
        assert!(chunks.len() >= 3);
        assert!(chunks.iter().any(|c| c.title == "Returns Policy"));
        assert!(chunks.iter().any(|c| c.title == "Shipping" && c.section.is_none()));
    }
}
