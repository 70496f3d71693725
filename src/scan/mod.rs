//! Populate outputs from example files
//!
//! Walks a directory of example output files, sniffs each delimited table,
//! and builds one output spec per readable file with column naming inferred
//! through the term dictionary. The scan replaces the session's output list
//! wholesale, mirroring a re-run of the workflow.

use crate::catalog::TermDictionary;
use crate::error::{ForgeError, ForgeResult};
use crate::workflow::{ColumnSpec, Delimiter, OutputSpec};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Scan settings
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// File extensions to consider (without dots)
    pub extensions: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["csv".to_string(), "tsv".to_string(), "txt".to_string()],
        }
    }
}

impl ScanOptions {
    fn matches(&self, file_name: &str) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        self.extensions
            .iter()
            .any(|ext| file_name.contains(&format!(".{}", ext.trim_matches('.'))))
    }
}

/// Result of scanning a directory
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// One spec per readable delimited file, in path order
    pub outputs: Vec<OutputSpec>,

    /// Files matching the extension filter that could not be read as a table
    pub skipped: Vec<String>,
}

/// Scan a directory of example output files
pub async fn scan_dir(
    dir: &Path,
    options: &ScanOptions,
    terms: &TermDictionary,
) -> ForgeResult<ScanOutcome> {
    if !dir.is_dir() {
        return Err(ForgeError::PathNotFound(dir.to_path_buf()));
    }

    let mut files = collect_files(dir).await?;
    files.sort();

    let mut outcome = ScanOutcome::default();
    for relative in files {
        let name = relative.to_string_lossy().replace('\\', "/");
        if !options.matches(&name) {
            continue;
        }

        let content = match fs::read_to_string(dir.join(&relative)).await {
            Ok(content) => content,
            Err(_) => {
                outcome.skipped.push(name);
                continue;
            }
        };

        match sniff_table(&name, &content) {
            Some((delimiter, headers)) => {
                debug!("Parsed {} ({} columns)", name, headers.len());
                outcome.outputs.push(build_spec(&name, delimiter, &headers, terms));
            }
            None => outcome.skipped.push(name),
        }
    }

    Ok(outcome)
}

/// Collect all file paths under the directory, relative to it
async fn collect_files(dir: &Path) -> ForgeResult<Vec<PathBuf>> {
    let mut files = vec![];
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut entries = fs::read_dir(&current)
            .await
            .map_err(|e| ForgeError::io(format!("reading {}", current.display()), e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ForgeError::io("reading directory entry", e))?
        {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if let Ok(relative) = path.strip_prefix(dir) {
                files.push(relative.to_path_buf());
            }
        }
    }

    Ok(files)
}

/// Determine the delimiter and header row of a table
///
/// Tab is tried first for files named like TSVs, comma first otherwise. A
/// parse yielding a single column is treated as a failed sniff.
fn sniff_table(file_name: &str, content: &str) -> Option<(Delimiter, Vec<String>)> {
    let header_line = content.lines().find(|line| !line.trim().is_empty())?;

    let candidates = if file_name.contains("tsv") {
        [Delimiter::Tab, Delimiter::Comma]
    } else {
        [Delimiter::Comma, Delimiter::Tab]
    };

    for delimiter in candidates {
        let headers: Vec<String> = header_line
            .split(delimiter.as_str())
            .map(|field| field.trim().trim_matches('"').to_string())
            .collect();
        if headers.len() > 1 {
            return Some((delimiter, headers));
        }
    }

    None
}

fn build_spec(
    name: &str,
    delimiter: Delimiter,
    headers: &[String],
    terms: &TermDictionary,
) -> OutputSpec {
    let columns = headers
        .iter()
        .map(|header| {
            let naming = terms.infer(header, name);
            ColumnSpec {
                col: header.clone(),
                name: naming.name,
                desc: naming.desc,
            }
        })
        .collect();

    let display = name.replace('/', "_");
    OutputSpec {
        name: display.clone(),
        desc: display,
        source: name.to_string(),
        delimiter,
        columns,
        ..OutputSpec::default()
    }
}
