//! Pipeline-host catalog
//!
//! The metadata that feeds the form's selectors: process types a workflow can
//! relate to and reference data types a parameter can point at. The hosting
//! platform itself is out of scope; a JSON catalog file (or the built-in
//! copy) stands in for it. Every lookup is memoized in the session cache, so
//! a catalog read happens at most once per session until a refresh.

pub mod terms;

pub use terms::{ColumnNaming, TermDictionary};

use crate::config::AppConfig;
use crate::error::{ForgeError, ForgeResult};
use crate::session::SessionCache;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// Catalog compiled into the binary, used when no file is configured
const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.json");

/// One process type known to the pipeline host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessEntry {
    /// Stable process ID
    pub id: String,

    /// Human-readable process name
    pub name: String,

    /// Whether this process ingests raw data (as opposed to running a workflow)
    #[serde(default)]
    pub ingest: bool,
}

/// One validated file within a reference type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceFile {
    /// File type label
    pub file_type: String,

    /// Name the file is saved under
    pub save_as: String,
}

/// One reference data type known to the pipeline host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceEntry {
    /// Human-readable reference name
    pub name: String,

    /// Longer description
    #[serde(default)]
    pub description: String,

    /// Directory the reference lives under
    pub directory: String,

    /// Files making up the reference
    #[serde(default)]
    pub validation: Vec<ReferenceFile>,
}

/// Parsed catalog file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    processes: Vec<ProcessEntry>,

    #[serde(default)]
    references: Vec<ReferenceEntry>,
}

/// Source of catalog data
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// List all process types
    async fn processes(&self) -> ForgeResult<Vec<ProcessEntry>>;

    /// List all reference types
    async fn references(&self) -> ForgeResult<Vec<ReferenceEntry>>;
}

/// Catalog backed by a JSON file, or the built-in copy when no path is set
pub struct FileCatalog {
    path: Option<PathBuf>,
}

impl FileCatalog {
    /// Create a catalog source for the given file, or the built-in catalog
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    async fn read(&self) -> ForgeResult<CatalogFile> {
        let content = match &self.path {
            Some(path) => {
                debug!("Reading catalog from {}", path.display());
                fs::read_to_string(path)
                    .await
                    .map_err(|e| ForgeError::CatalogUnavailable {
                        reason: format!("reading {}: {}", path.display(), e),
                    })?
            }
            None => BUILTIN_CATALOG.to_string(),
        };

        serde_json::from_str(&content).map_err(|e| ForgeError::CatalogUnavailable {
            reason: format!("catalog file: {}", e),
        })
    }
}

#[async_trait]
impl CatalogSource for FileCatalog {
    async fn processes(&self) -> ForgeResult<Vec<ProcessEntry>> {
        Ok(self.read().await?.processes)
    }

    async fn references(&self) -> ForgeResult<Vec<ReferenceEntry>> {
        Ok(self.read().await?.references)
    }
}

/// Cached facade over a catalog source
///
/// Results land in the session cache keyed by call name, so they survive
/// across invocations and are dropped by `session refresh`.
pub struct Catalog {
    source: Box<dyn CatalogSource>,
}

impl Catalog {
    /// Wrap a catalog source
    pub fn new(source: Box<dyn CatalogSource>) -> Self {
        Self { source }
    }

    /// Build the catalog configured for this installation
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Box::new(FileCatalog::new(config.catalog.path.clone())))
    }

    /// All process entries, memoized per session
    pub async fn processes(&self, cache: &mut SessionCache) -> ForgeResult<Vec<ProcessEntry>> {
        if let Some(cached) = cache.lookup("list_processes", &[])? {
            return Ok(cached);
        }
        let entries = self.source.processes().await?;
        cache.store("list_processes", &[], &entries)?;
        Ok(entries)
    }

    /// All reference entries, memoized per session
    pub async fn references(&self, cache: &mut SessionCache) -> ForgeResult<Vec<ReferenceEntry>> {
        if let Some(cached) = cache.lookup("list_references", &[])? {
            return Ok(cached);
        }
        let entries = self.source.references().await?;
        cache.store("list_references", &[], &entries)?;
        Ok(entries)
    }

    /// Sorted, de-duplicated `"Name (id)"` labels
    ///
    /// With `ingest` set, ingest processes are included alongside workflow
    /// processes; otherwise only workflow processes are listed.
    pub async fn process_labels(
        &self,
        cache: &mut SessionCache,
        ingest: bool,
    ) -> ForgeResult<Vec<String>> {
        let args = [if ingest { "ingest=true" } else { "ingest=false" }];
        if let Some(cached) = cache.lookup("process_labels", &args)? {
            return Ok(cached);
        }

        let labels: Vec<String> = self
            .processes(cache)
            .await?
            .iter()
            .filter(|p| ingest || !p.ingest)
            .map(|p| format!("{} ({})", p.name, p.id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        cache.store("process_labels", &args, &labels)?;
        Ok(labels)
    }

    /// All process IDs (ingest and workflow alike)
    pub async fn process_ids(&self, cache: &mut SessionCache) -> ForgeResult<Vec<String>> {
        Ok(self
            .processes(cache)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect())
    }

    /// Extract the process ID from a `"Name (id)"` label
    pub fn process_id(label: &str) -> String {
        match label.rsplit_once(" (") {
            Some((_, id)) => id.trim_end_matches(')').to_string(),
            None => label.to_string(),
        }
    }

    /// Find the display label carrying the given process ID
    pub async fn label_for_process(
        &self,
        cache: &mut SessionCache,
        id: &str,
    ) -> ForgeResult<Option<String>> {
        let needle = format!("({})", id);
        Ok(self
            .process_labels(cache, true)
            .await?
            .into_iter()
            .find(|label| label.ends_with(&needle)))
    }

    /// Names of all reference types, in catalog order
    pub async fn reference_names(&self, cache: &mut SessionCache) -> ForgeResult<Vec<String>> {
        Ok(self
            .references(cache)
            .await?
            .into_iter()
            .map(|r| r.name)
            .collect())
    }

    /// Find a reference by display name or directory
    pub async fn reference(
        &self,
        cache: &mut SessionCache,
        name_or_directory: &str,
    ) -> ForgeResult<ReferenceEntry> {
        self.references(cache)
            .await?
            .into_iter()
            .find(|r| r.name == name_or_directory || r.directory == name_or_directory)
            .ok_or_else(|| ForgeError::CatalogEntryNotFound {
                kind: "reference",
                name: name_or_directory.to_string(),
            })
    }

    /// File names a reference type can save as
    pub async fn reference_files(
        &self,
        cache: &mut SessionCache,
        name_or_directory: &str,
    ) -> ForgeResult<Vec<String>> {
        Ok(self
            .reference(cache, name_or_directory)
            .await?
            .validation
            .into_iter()
            .map(|f| f.save_as)
            .collect())
    }

    /// Glob matching the files of the named reference type, memoized per name
    pub async fn reference_glob(
        &self,
        cache: &mut SessionCache,
        name: &str,
    ) -> ForgeResult<String> {
        if let Some(cached) = cache.lookup("reference_glob", &[name])? {
            return Ok(cached);
        }

        let reference = self.reference(cache, name).await?;
        let file = reference
            .validation
            .first()
            .map(|f| f.save_as.as_str())
            .unwrap_or("*");
        let glob = format!("**/{}/**/{}", reference.directory, file);

        cache.store("reference_glob", &[name], &glob)?;
        Ok(glob)
    }
}
