//! Fragment Ingestion
//!
//! Turns user input into the ordered fragment list the prompt builder
//! consumes. Two sources exist: freeform notes (one fragment per non-blank
//! line) and documents (one fragment per file, prefixed with a FILE
//! header). Real PDF/DOCX text extraction is out of scope; those types
//! yield stub placeholder text the way the source application simulated
//! them.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::types::{Result, TreeError};

/// Text recovered from one input file.
#[derive(Debug, Clone)]
pub struct Document {
    pub file_name: String,
    pub text: String,
}

/// Split a notes blob into fragments: one per non-blank line, trimmed,
/// input order preserved.
pub fn split_notes(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Read one document. Plain-text formats are read as-is; PDF and Word
/// formats yield placeholder text; anything else is rejected.
pub fn read_document(path: &Path) -> Result<Document> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(String::from)
        .ok_or_else(|| TreeError::InvalidInput(format!("invalid path: {}", path.display())))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let text = match extension.as_str() {
        "txt" | "md" | "markdown" => {
            debug!(file = %file_name, "Reading text document");
            fs::read_to_string(path)?
        }
        "pdf" | "doc" | "docx" => {
            warn!(file = %file_name, "Text extraction for this format is stubbed");
            format!(
                "Placeholder text for {}: real {} extraction is not performed.",
                file_name,
                extension.to_uppercase()
            )
        }
        _ => {
            return Err(TreeError::InvalidInput(format!(
                "unsupported file type: {} (expected txt, md, pdf, doc, docx)",
                file_name
            )));
        }
    };

    Ok(Document { file_name, text })
}

/// One fragment per document, each carrying its file header so the model
/// can attribute content.
pub fn documents_to_fragments(documents: &[Document]) -> Vec<String> {
    documents
        .iter()
        .map(|doc| format!("--- FILE: {} ---\n\n{}", doc.file_name, doc.text))
        .collect()
}
