//! `treeloom generate`
//!
//! Gathers fragments from notes and documents, runs one generation
//! session, and writes the exported tree to stdout or a file. Ctrl-C
//! cancels the in-flight generation between suspension points.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::ValueEnum;
use console::style;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::ai::retry::CancelHandle;
use crate::ai::ModelId;
use crate::cli::status::ConsoleStatus;
use crate::config::ConfigLoader;
use crate::ingest;
use crate::session::Session;
use crate::types::{Result, TreeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
    Svg,
}

#[derive(Debug)]
pub struct GenerateOptions {
    /// Notes given directly on the command line (repeatable)
    pub notes: Vec<String>,
    /// File of notes, one fragment per non-blank line
    pub notes_file: Option<PathBuf>,
    /// Documents to ingest (txt, md, pdf, doc, docx)
    pub documents: Vec<PathBuf>,
    /// Structure hint text
    pub structure: Option<String>,
    /// File containing a structure hint
    pub structure_file: Option<PathBuf>,
    /// Model override
    pub model: Option<ModelId>,
    /// Export format
    pub format: ExportFormat,
    /// Output path; stdout when absent
    pub output: Option<PathBuf>,
}

pub fn run(options: GenerateOptions) -> Result<()> {
    let runtime = Runtime::new()?;
    runtime.block_on(run_inner(options))
}

async fn run_inner(options: GenerateOptions) -> Result<()> {
    let config = ConfigLoader::load()?;

    let (fragments, source_files) = gather_fragments(&options)?;
    let structure_hint = gather_structure_hint(&options)?;

    let session = Session::new(&config, Arc::new(ConsoleStatus))?;

    let cancel = CancelHandle::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{}", style("Cancelling...").yellow());
            ctrl_c_cancel.cancel();
        }
    });

    let id = session
        .generate(
            options.model,
            fragments,
            structure_hint,
            source_files,
            &cancel,
        )
        .await
        .map_err(|e| {
            // the status sink already showed the user-facing message
            debug!(error = %e, "Generation failed");
            e
        })?;

    let stored = session
        .store()
        .get(&id)
        .ok_or_else(|| TreeError::UnknownTree(id.to_string()))?;

    eprintln!(
        "{}",
        style(format!(
            "Tree {}: {} nodes, depth {}",
            id,
            stored.tree.node_count(),
            stored.tree.depth()
        ))
        .dim()
    );

    let rendered = match options.format {
        ExportFormat::Json => session.store().to_json(&id),
        ExportFormat::Markdown => session.store().to_markdown(&id),
        ExportFormat::Svg => session.store().to_svg(&id),
    }
    .ok_or_else(|| TreeError::UnknownTree(id.to_string()))?;

    match &options.output {
        Some(path) => {
            fs::write(path, rendered)?;
            eprintln!("{}", style(format!("Wrote {}", path.display())).green());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

/// Collect fragments from every input source, notes first, then documents
/// in argument order.
fn gather_fragments(options: &GenerateOptions) -> Result<(Vec<String>, Vec<String>)> {
    let mut fragments = Vec::new();

    for note in &options.notes {
        fragments.extend(ingest::split_notes(note));
    }

    if let Some(path) = &options.notes_file {
        let text = fs::read_to_string(path)?;
        fragments.extend(ingest::split_notes(&text));
    }

    let mut documents = Vec::new();
    for path in &options.documents {
        documents.push(ingest::read_document(path)?);
    }
    let source_files: Vec<String> = documents.iter().map(|d| d.file_name.clone()).collect();
    fragments.extend(ingest::documents_to_fragments(&documents));

    if fragments.is_empty() {
        return Err(TreeError::InvalidInput(
            "no input: pass --note, --notes-file, or document paths".to_string(),
        ));
    }

    Ok((fragments, source_files))
}

fn gather_structure_hint(options: &GenerateOptions) -> Result<Option<String>> {
    if let Some(hint) = &options.structure {
        return Ok(Some(hint.clone()));
    }
    if let Some(path) = &options.structure_file {
        return Ok(Some(fs::read_to_string(path)?));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn options() -> GenerateOptions {
        GenerateOptions {
            notes: Vec::new(),
            notes_file: None,
            documents: Vec::new(),
            structure: None,
            structure_file: None,
            model: None,
            format: ExportFormat::Json,
            output: None,
        }
    }

    #[test]
    fn test_gather_fragments_requires_some_input() {
        let err = gather_fragments(&options()).unwrap_err();
        assert!(matches!(err, TreeError::InvalidInput(_)));
    }

    #[test]
    fn test_multiline_note_splits_into_fragments() {
        let mut opts = options();
        opts.notes = vec!["alpha\nbeta".to_string()];

        let (fragments, source_files) = gather_fragments(&opts).unwrap();
        assert_eq!(fragments, vec!["alpha", "beta"]);
        assert!(source_files.is_empty());
    }

    #[test]
    fn test_documents_contribute_fragments_and_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, "document body").unwrap();

        let mut opts = options();
        opts.notes = vec!["a note".to_string()];
        opts.documents = vec![path];

        let (fragments, source_files) = gather_fragments(&opts).unwrap();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0], "a note");
        assert!(fragments[1].starts_with("--- FILE: doc.txt ---"));
        assert_eq!(source_files, vec!["doc.txt"]);
    }

    #[test]
    fn test_inline_structure_wins_over_file() {
        let mut opts = options();
        opts.structure = Some("inline".to_string());
        opts.structure_file = Some(PathBuf::from("/nonexistent"));

        assert_eq!(gather_structure_hint(&opts).unwrap().as_deref(), Some("inline"));
    }
}
