//! Answer generator trait and prompt construction

use async_trait::async_trait;

use crate::error::Result;
use crate::types::StoredRecord;

/// Context text is excerpted to this many characters per chunk when
/// building prompts and stub summaries
pub const CONTEXT_EXCERPT_CHARS: usize = 600;

/// Trait for producing a natural-language answer from a query and the
/// retrieved context chunks
///
/// Implementations:
/// - `StubGenerator`: deterministic, offline
/// - `OllamaGenerator`: hosted LLM with grounding prompt
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate an answer grounded in the given contexts (in rank order)
    async fn generate(&self, query: &str, contexts: &[StoredRecord]) -> Result<String>;

    /// Model identifier for reporting
    fn model_name(&self) -> &str;
}

/// Truncate to at most `max_chars` characters on a char boundary,
/// appending an ellipsis when anything was cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}...", truncated)
}

/// Prompt builder for grounded generation
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the grounding prompt: the question, each source with an
    /// excerpt, and the instruction to answer only from the sources.
    pub fn build_grounded_prompt(query: &str, contexts: &[StoredRecord]) -> String {
        let mut prompt = String::from(
            "You are a helpful company policy assistant. \
             Cite sources by title and section when relevant.\n",
        );
        prompt.push_str(&format!("Question: {}\nSources:\n", query));

        for context in contexts {
            let section = context.section.as_deref().unwrap_or("Section");
            prompt.push_str(&format!(
                "- {} | {}\n{}\n---\n",
                context.title,
                section,
                truncate_chars(&context.text, CONTEXT_EXCERPT_CHARS)
            ));
        }

        prompt.push_str(
            "Write a concise, accurate answer grounded only in the sources above. \
             If the sources do not contain the answer, say so.",
        );
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(title: &str, section: Option<&str>, text: &str) -> StoredRecord {
        StoredRecord {
            id: 1,
            hash: "h".to_string(),
            title: title.to_string(),
            section: section.map(str::to_string),
            text: text.to_string(),
        }
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "héllo wörld".repeat(100);
        let truncated = truncate_chars(&text, 600);
        assert_eq!(truncated.chars().count(), 603);
        assert!(truncated.ends_with("..."));

        assert_eq!(truncate_chars("short", 600), "short");
    }

    #[test]
    fn prompt_embeds_sources_and_instruction() {
        let contexts = vec![
            context("Returns Policy", Some("Refund Window"), "Refunds within 30 days."),
            context("Shipping", None, "Ships in 2 days."),
        ];
        let prompt = PromptBuilder::build_grounded_prompt("What is the refund window?", &contexts);

        assert!(prompt.contains("Question: What is the refund window?"));
        assert!(prompt.contains("Returns Policy | Refund Window"));
        assert!(prompt.contains("Shipping | Section"));
        assert!(prompt.contains("grounded only in the sources"));
    }
}
