//! Column term dictionary
//!
//! Maps sanitized column headers to curated display names and descriptions,
//! optionally scoped to a specific file. Used when populating output specs
//! from example files.

use crate::error::{ForgeError, ForgeResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

/// Dictionary compiled into the binary, used when no file is configured
const BUILTIN_TERMS: &str = include_str!("../../data/terms.json");

/// Curated naming for one column term
#[derive(Debug, Clone, Deserialize)]
pub struct Term {
    /// Per-file naming entries; a `file` of `*` matches any file
    #[serde(default)]
    pub metadata: Vec<TermMeta>,
}

/// One naming entry within a term
#[derive(Debug, Clone, Deserialize)]
pub struct TermMeta {
    /// File the entry applies to, or `*` for all files
    pub file: String,

    /// Display name
    pub name: String,

    /// Longer description
    pub desc: String,
}

/// Inferred naming for a column header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNaming {
    pub name: String,
    pub desc: String,
}

/// Lookup table from sanitized column header to curated naming
#[derive(Debug, Clone)]
pub struct TermDictionary {
    terms: HashMap<String, Term>,
}

impl TermDictionary {
    /// Parse a dictionary from a JSON string
    pub fn parse(content: &str) -> ForgeResult<Self> {
        let terms: HashMap<String, Term> =
            serde_json::from_str(content).map_err(|e| ForgeError::CatalogUnavailable {
                reason: format!("term dictionary: {}", e),
            })?;
        Ok(Self { terms })
    }

    /// The dictionary compiled into the binary
    pub fn builtin() -> ForgeResult<Self> {
        Self::parse(BUILTIN_TERMS)
    }

    /// Load from a file, or fall back to the built-in dictionary
    pub async fn load(path: Option<&Path>) -> ForgeResult<Self> {
        match path {
            Some(path) => {
                let content = fs::read_to_string(path).await.map_err(|e| {
                    ForgeError::CatalogUnavailable {
                        reason: format!("reading {}: {}", path.display(), e),
                    }
                })?;
                Self::parse(&content)
            }
            None => Self::builtin(),
        }
    }

    /// Normalize a column header for dictionary lookup
    ///
    /// Lowercased, runs of non-alphanumeric characters collapsed to a single
    /// underscore, leading/trailing underscores trimmed.
    pub fn sanitize(cname: &str) -> String {
        let mut out = String::with_capacity(cname.len());
        let mut pending_sep = false;

        for c in cname.trim().chars() {
            if c.is_ascii_alphanumeric() {
                if pending_sep && !out.is_empty() {
                    out.push('_');
                }
                pending_sep = false;
                out.push(c.to_ascii_lowercase());
            } else {
                pending_sep = true;
            }
        }

        out
    }

    /// Return the curated naming for a column, if any
    ///
    /// Entries are checked in reverse order so the most specific (file-scoped)
    /// entries listed last take precedence over the `*` fallback.
    pub fn infer(&self, cname: &str, file_name: &str) -> ColumnNaming {
        let sanitized = Self::sanitize(cname);
        let file_name = file_name.strip_prefix("data/").unwrap_or(file_name);

        if let Some(term) = self.terms.get(&sanitized) {
            for meta in term.metadata.iter().rev() {
                let meta_file = meta.file.strip_prefix("data/").unwrap_or(&meta.file);
                if meta_file == file_name || meta.file == "*" {
                    return ColumnNaming {
                        name: meta.name.clone(),
                        desc: meta.desc.clone(),
                    };
                }
            }
        }

        ColumnNaming {
            name: sanitized,
            desc: String::new(),
        }
    }
}
