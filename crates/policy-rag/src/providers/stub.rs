//! Deterministic offline answer generator
//!
//! Lists the retrieved sources, then appends a truncated concatenation of
//! the context text as a pseudo-summary. No external dependency and no
//! randomness, which makes it the safe default and the workhorse of the
//! test suite.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::StoredRecord;

use super::llm::{truncate_chars, Generator, CONTEXT_EXCERPT_CHARS};

/// Offline stub generator
#[derive(Debug, Default)]
pub struct StubGenerator;

impl StubGenerator {
    /// Create a new stub generator
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Generator for StubGenerator {
    async fn generate(&self, _query: &str, contexts: &[StoredRecord]) -> Result<String> {
        let mut lines = vec!["Answer (stub): Based on the following sources:".to_string()];
        for context in contexts {
            let section = context.section.as_deref().unwrap_or("Section");
            lines.push(format!("- {} - {}", context.title, section));
        }
        lines.push("Summary:".to_string());

        let joined = contexts
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(truncate_chars(&joined, CONTEXT_EXCERPT_CHARS));

        Ok(lines.join("\n"))
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(title: &str, section: Option<&str>, text: &str) -> StoredRecord {
        StoredRecord {
            id: 0,
            hash: String::new(),
            title: title.to_string(),
            section: section.map(str::to_string),
            text: text.to_string(),
        }
    }

    #[test]
    fn output_is_deterministic() {
        let generator = StubGenerator::new();
        let contexts = vec![context("Returns Policy", Some("Refunds"), "30 day window.")];

        let a = tokio_test::block_on(generator.generate("q", &contexts)).unwrap();
        let b = tokio_test::block_on(generator.generate("q", &contexts)).unwrap();
        assert_eq!(a, b);
        assert!(a.contains("Returns Policy - Refunds"));
        assert!(a.contains("30 day window."));
    }

    #[test]
    fn long_context_is_truncated() {
        let generator = StubGenerator::new();
        let contexts = vec![context("T", None, &"word ".repeat(500))];

        let answer = tokio_test::block_on(generator.generate("q", &contexts)).unwrap();
        let summary = answer.lines().last().unwrap();
        assert!(summary.chars().count() <= CONTEXT_EXCERPT_CHARS + 3);
        assert!(summary.ends_with("..."));
    }
}
