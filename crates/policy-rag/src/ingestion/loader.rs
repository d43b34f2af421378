//! Filesystem corpus loader
//!
//! Reads Markdown and plain-text files from the data directory and turns
//! them into `{title, section, text}` documents. Markdown files are split
//! into one document per `## ` section; the first `# ` heading (or the file
//! stem) becomes the title.

use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::types::Document;

/// Load all corpus documents from `dir`, sorted by path for determinism.
/// A missing directory is a distinct not-found failure so the API layer can
/// report it as such.
pub fn load_documents(dir: &Path) -> Result<Vec<Document>> {
    if !dir.is_dir() {
        return Err(Error::CorpusNotFound(dir.display().to_string()));
    }

    let mut paths: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("md") | Some("markdown") | Some("txt")
            )
        })
        .collect();
    paths.sort();

    let mut documents = Vec::new();
    for path in paths {
        let content = std::fs::read_to_string(&path)?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .to_string();

        let is_markdown = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("md") | Some("markdown")
        );
        if is_markdown {
            documents.extend(split_markdown(&stem, &content));
        } else if !content.trim().is_empty() {
            documents.push(Document {
                title: stem,
                section: None,
                text: content.trim().to_string(),
            });
        }
    }

    tracing::info!("Loaded {} documents from {}", documents.len(), dir.display());
    Ok(documents)
}

/// Split a Markdown file into per-section documents. Text before the first
/// `## ` heading belongs to a sectionless document.
fn split_markdown(stem: &str, content: &str) -> Vec<Document> {
    let mut title = stem.to_string();
    let mut documents = Vec::new();
    let mut section: Option<String> = None;
    let mut buffer = String::new();

    let flush = |section: &Option<String>, buffer: &mut String, title: &str, out: &mut Vec<Document>| {
        let text = buffer.trim();
        if !text.is_empty() {
            out.push(Document {
                title: title.to_string(),
                section: section.clone(),
                text: text.to_string(),
            });
        }
        buffer.clear();
    };

    for line in content.lines() {
        if let Some(heading) = line.strip_prefix("# ") {
            // Document title; not part of any section's text
            title = heading.trim().to_string();
        } else if let Some(heading) = line.strip_prefix("## ") {
            flush(&section, &mut buffer, &title, &mut documents);
            section = Some(heading.trim().to_string());
        } else {
            buffer.push_str(line);
            buffer.push('\n');
        }
    }
    flush(&section, &mut buffer, &title, &mut documents);

    documents
}
