//! Workflow identity page
//!
//! The fields describing the workflow itself: id, naming, executor,
//! repository coordinates, and the processes it relates to. Dumps into the
//! `dynamo` section of the document.

use crate::catalog::Catalog;
use crate::error::ForgeResult;
use crate::workflow::fields::{FieldSpec, FieldValue};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::OnceLock;

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("^[a-z0-9-]+$").unwrap_or_else(|_| unreachable!()))
}

/// Workflow executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Executor {
    #[serde(rename = "NEXTFLOW")]
    Nextflow,

    #[serde(rename = "CROMWELL")]
    Cromwell,
}

impl Executor {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Nextflow => "Nextflow",
            Self::Cromwell => "Cromwell",
        }
    }

    /// Parse a display label, defaulting to Nextflow
    pub fn from_label(label: &str) -> Self {
        if label.eq_ignore_ascii_case("cromwell") {
            Self::Cromwell
        } else {
            Self::Nextflow
        }
    }
}

/// GitHub repository visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Repository {
    #[serde(rename = "GITHUBPUBLIC")]
    GithubPublic,

    #[serde(rename = "GITHUBPRIVATE")]
    GithubPrivate,
}

impl Repository {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::GithubPublic => "Public",
            Self::GithubPrivate => "Private",
        }
    }

    /// Parse a display label, defaulting to public
    pub fn from_label(label: &str) -> Self {
        if label.eq_ignore_ascii_case("private") {
            Self::GithubPrivate
        } else {
            Self::GithubPublic
        }
    }
}

/// Repository coordinates for the workflow code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeSpec {
    /// Repository visibility
    pub repository: Repository,

    /// Script from the repository used to launch the workflow
    pub script: String,

    /// Repository path formatted as organization/repository
    pub uri: String,

    /// Branch, commit, tag, or release
    pub version: String,
}

impl Default for CodeSpec {
    fn default() -> Self {
        Self {
            repository: Repository::GithubPublic,
            script: "main.nf".to_string(),
            uri: "organization/repository_name".to_string(),
            version: "main".to_string(),
        }
    }
}

/// Workflow identity state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceState {
    /// Unique workflow ID, lowercase alphanumeric with dashes
    pub id: String,

    /// Short name used to display the workflow in a list
    pub name: String,

    /// Longer description of the workflow
    pub desc: String,

    /// Workflow executor
    pub executor: Executor,

    /// Optional documentation page
    #[serde(rename = "documentationUrl")]
    pub documentation_url: String,

    /// Processes that can consume this workflow's outputs
    #[serde(rename = "childProcessIds")]
    pub child_process_ids: Vec<String>,

    /// Processes whose outputs can feed this workflow
    #[serde(rename = "parentProcessIds")]
    pub parent_process_ids: Vec<String>,

    /// Repository coordinates
    pub code: CodeSpec,
}

impl Default for SourceState {
    fn default() -> Self {
        Self {
            id: "unique-workflow-id".to_string(),
            name: "My Workflow Name".to_string(),
            desc: "Description of my workflow".to_string(),
            executor: Executor::Nextflow,
            documentation_url: String::new(),
            child_process_ids: vec![],
            parent_process_ids: vec![],
            code: CodeSpec::default(),
        }
    }
}

impl SourceState {
    /// Load from the `dynamo` section of a document
    pub fn from_doc(doc: &Value) -> ForgeResult<Self> {
        match doc.get("dynamo") {
            Some(section) => Ok(serde_json::from_value(section.clone())?),
            None => Ok(Self::default()),
        }
    }

    /// Render the `dynamo` section
    pub fn dump(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "desc": self.desc,
            "executor": self.executor,
            "documentationUrl": self.documentation_url,
            "childProcessIds": self.child_process_ids,
            "parentProcessIds": self.parent_process_ids,
            "code": {
                "repository": self.code.repository,
                "script": self.code.script,
                "uri": self.code.uri,
                "version": self.code.version,
            },
        })
    }

    /// Whether the workflow ID has the required shape
    pub fn id_is_valid(&self) -> bool {
        id_pattern().is_match(&self.id)
    }

    /// The page's field list, rendered data-driven by the wizard
    ///
    /// `all_labels` feeds the parent-process selector (ingest processes
    /// included), `workflow_labels` the child-process selector.
    pub fn field_specs(&self, all_labels: &[String], workflow_labels: &[String]) -> Vec<FieldSpec> {
        let selected = |ids: &[String], labels: &[String]| -> Vec<String> {
            labels
                .iter()
                .filter(|label| ids.contains(&Catalog::process_id(label)))
                .cloned()
                .collect()
        };

        vec![
            FieldSpec::text(
                "id",
                "Workflow ID",
                "Must be all lowercase alphanumeric with dashes",
                &self.id,
            ),
            FieldSpec::text(
                "name",
                "Workflow Name",
                "Short name used to display the workflow in a list",
                &self.name,
            ),
            FieldSpec::text(
                "desc",
                "Workflow Description",
                "Longer description providing more details on the workflow (8-15 words)",
                &self.desc,
            ),
            FieldSpec::select(
                "executor",
                "Workflow Executor",
                "Engine used to run the workflow",
                vec!["Nextflow".to_string(), "Cromwell".to_string()],
                self.executor.label(),
            ),
            FieldSpec::text(
                "uri",
                "Workflow Repository Path",
                "Path to the workflow's GitHub repository formatted as organization/repository",
                &self.code.uri,
            ),
            FieldSpec::text(
                "script",
                "Workflow Entrypoint Script",
                "Script from the repository used to launch the workflow",
                &self.code.script,
            ),
            FieldSpec::text(
                "version",
                "Repository Branch / Version",
                "Often 'main' (branch), but commits, tags, and releases work too",
                &self.code.version,
            ),
            FieldSpec::select(
                "repository",
                "Public or Private GitHub Repository",
                "Private repositories must be connected to the pipeline host",
                vec!["Public".to_string(), "Private".to_string()],
                self.code.repository.label(),
            ),
            FieldSpec::text(
                "documentation_url",
                "Documentation URL (optional)",
                "Webpage documenting the workflow",
                &self.documentation_url,
            ),
            FieldSpec::multi_select(
                "parent_process_ids",
                "Processes with outputs usable as inputs to this workflow",
                "Datasets of these types can be selected when launching this workflow",
                all_labels.to_vec(),
                selected(&self.parent_process_ids, all_labels),
            ),
            FieldSpec::multi_select(
                "child_process_ids",
                "Processes that can use this workflow's outputs as inputs",
                "These processes can run on datasets produced by this workflow",
                workflow_labels.to_vec(),
                selected(&self.child_process_ids, workflow_labels),
            ),
        ]
    }

    /// Apply an entered value under its field key
    pub fn apply(&mut self, key: &str, value: &FieldValue) {
        let text = || value.as_text().unwrap_or_default().to_string();
        let ids = || -> Vec<String> {
            value
                .as_list()
                .unwrap_or_default()
                .iter()
                .map(|label| Catalog::process_id(label))
                .collect()
        };

        match key {
            "id" => self.id = text(),
            "name" => self.name = text(),
            "desc" => self.desc = text(),
            "executor" => self.executor = Executor::from_label(&text()),
            "uri" => self.code.uri = text(),
            "script" => self.code.script = text(),
            "version" => self.code.version = text(),
            "repository" => self.code.repository = Repository::from_label(&text()),
            "documentation_url" => self.documentation_url = text(),
            "parent_process_ids" => self.parent_process_ids = ids(),
            "child_process_ids" => self.child_process_ids = ids(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_blank_document() {
        let state = SourceState::default();
        assert_eq!(state.id, "unique-workflow-id");
        assert_eq!(state.code.script, "main.nf");
        assert_eq!(state.executor, Executor::Nextflow);
    }

    #[test]
    fn executor_serializes_uppercase() {
        let dumped = SourceState::default().dump();
        assert_eq!(dumped["executor"], "NEXTFLOW");
        assert_eq!(dumped["code"]["repository"], "GITHUBPUBLIC");
    }

    #[test]
    fn dump_and_load_round_trip() {
        let mut state = SourceState::default();
        state.id = "my-workflow".to_string();
        state.executor = Executor::Cromwell;
        state.parent_process_ids = vec!["paired_dnaseq".to_string()];

        let doc = json!({ "dynamo": state.dump() });
        let loaded = SourceState::from_doc(&doc).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn missing_section_loads_defaults() {
        let loaded = SourceState::from_doc(&json!({})).unwrap();
        assert_eq!(loaded, SourceState::default());
    }

    #[test]
    fn id_shape() {
        let mut state = SourceState::default();
        assert!(state.id_is_valid());

        state.id = "Has Spaces".to_string();
        assert!(!state.id_is_valid());

        state.id = "ok-123".to_string();
        assert!(state.id_is_valid());

        state.id = String::new();
        assert!(!state.id_is_valid());
    }

    #[test]
    fn apply_maps_labels_to_ids() {
        let mut state = SourceState::default();
        state.apply(
            "parent_process_ids",
            &FieldValue::List(vec!["Paired DNA-seq (paired_dnaseq)".to_string()]),
        );
        assert_eq!(state.parent_process_ids, vec!["paired_dnaseq".to_string()]);

        state.apply("executor", &FieldValue::Text("Cromwell".to_string()));
        assert_eq!(state.executor, Executor::Cromwell);
    }

    #[test]
    fn field_specs_preselect_current_ids() {
        let mut state = SourceState::default();
        state.parent_process_ids = vec!["paired_dnaseq".to_string()];

        let labels = vec![
            "Paired DNA-seq (paired_dnaseq)".to_string(),
            "RNA-seq (rnaseq-1-0)".to_string(),
        ];
        let specs = state.field_specs(&labels, &labels);
        let parents = specs
            .iter()
            .find(|s| s.key == "parent_process_ids")
            .unwrap();
        assert_eq!(
            parents.value.as_list().unwrap(),
            &["Paired DNA-seq (paired_dnaseq)".to_string()]
        );
    }
}
