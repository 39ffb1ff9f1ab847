//! Manifest discovery and YAML parsing.
//!
//! Parsing is fault tolerant: a broken document becomes an `error` finding
//! pointing at its file and line, and the remaining documents of the file
//! (and all other files) are still loaded.

use capi_lint_core::{Document, Finding, Severity};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Category used for unreadable or unparsable manifests.
pub const YAML_SYNTAX: &str = "YAML syntax";

/// Errors raised while discovering manifest files.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Invalid glob pattern.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Directory traversal failed.
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// One parsed document with its position.
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    /// The parsed object.
    pub document: Document,
    /// 1-indexed line where the document's content starts.
    pub line: usize,
}

/// A loaded manifest file.
#[derive(Debug, Clone)]
pub struct ManifestFile {
    /// Path as given or discovered.
    pub path: PathBuf,
    /// Raw text, empty if the file could not be read.
    pub content: String,
    /// Successfully parsed documents, in file order.
    pub documents: Vec<ManifestDocument>,
    /// Read and parse failures.
    pub findings: Vec<Finding>,
}

impl ManifestFile {
    /// Iterates the parsed documents.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter().map(|d| &d.document)
    }
}

/// Returns true for `.yaml` / `.yml` paths.
#[must_use]
pub fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

/// Expands inputs into a sorted, de-duplicated list of manifest files.
///
/// Inputs may be files (taken as-is, even if they do not exist yet, so the
/// read failure surfaces as a finding), directories (top level only unless
/// `recursive`), or glob patterns.
///
/// # Errors
///
/// Returns an error for an invalid glob pattern or a directory walk failure.
pub fn discover(inputs: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>, ManifestError> {
    let mut files = Vec::new();

    for input in inputs {
        let text = input.to_string_lossy();
        if text.contains(['*', '?', '[']) {
            for entry in glob::glob(&text)? {
                match entry {
                    Ok(path) if path.is_file() && is_yaml(&path) => files.push(path),
                    Ok(_) => {}
                    Err(e) => warn!("Skipping unreadable glob match: {e}"),
                }
            }
        } else if input.is_dir() {
            let depth = if recursive { usize::MAX } else { 1 };
            for entry in WalkDir::new(input).follow_links(true).max_depth(depth) {
                let entry = entry?;
                if entry.file_type().is_file() && is_yaml(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(input.clone());
        }
    }

    files.sort();
    files.dedup();
    debug!("Discovered {} manifest file(s)", files.len());
    Ok(files)
}

/// Reads and parses one file. Never fails; problems become findings.
#[must_use]
pub fn load_file(path: &Path) -> ManifestFile {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let (documents, findings) = parse_str(&content, path);
            ManifestFile {
                path: path.to_path_buf(),
                content,
                documents,
                findings,
            }
        }
        Err(e) => ManifestFile {
            path: path.to_path_buf(),
            content: String::new(),
            documents: Vec::new(),
            findings: vec![Finding::new(
                Severity::Error,
                YAML_SYNTAX,
                path.display().to_string(),
                format!("Failed to read file: {e}"),
            )
            .in_file(path)],
        },
    }
}

/// Loads every file, in order.
#[must_use]
pub fn load_all(paths: &[PathBuf]) -> Vec<ManifestFile> {
    paths.iter().map(|p| load_file(p)).collect()
}

/// Splits a multi-document YAML stream and parses each part.
#[must_use]
pub fn parse_str(content: &str, path: &Path) -> (Vec<ManifestDocument>, Vec<Finding>) {
    let mut documents = Vec::new();
    let mut findings = Vec::new();

    for (start, chunk) in split_documents(content) {
        let Some(offset) = chunk
            .lines()
            .position(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
        else {
            continue;
        };
        let line = start + offset;

        match serde_yaml::from_str::<serde_yaml::Value>(&chunk) {
            Ok(serde_yaml::Value::Null) => {}
            Ok(value @ serde_yaml::Value::Mapping(_)) => documents.push(ManifestDocument {
                document: Document::from(value),
                line,
            }),
            Ok(_) => findings.push(
                Finding::new(
                    Severity::Error,
                    YAML_SYNTAX,
                    path.display().to_string(),
                    "Document is not a mapping",
                )
                .in_file(path)
                .at_line(line),
            ),
            Err(e) => {
                let error_line = e.location().map_or(line, |loc| start + loc.line() - 1);
                findings.push(
                    Finding::new(
                        Severity::Error,
                        YAML_SYNTAX,
                        path.display().to_string(),
                        format!("YAML syntax error: {e}"),
                    )
                    .with_recommendation("Fix the YAML syntax; other documents were still checked")
                    .in_file(path)
                    .at_line(error_line),
                );
            }
        }
    }

    (documents, findings)
}

/// Yields `(first line number, text)` for each `---`-separated chunk.
fn split_documents(content: &str) -> Vec<(usize, String)> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut start = 1;

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed.starts_with("--- ") || trimmed == "..." {
            chunks.push((start, std::mem::take(&mut current)));
            start = idx + 2;
            if let Some(rest) = trimmed.strip_prefix("--- ") {
                start = idx + 1;
                current.push_str(rest);
                current.push('\n');
            }
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    chunks.push((start, current));
    chunks
}
