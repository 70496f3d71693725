//! Config assembly
//!
//! Turns a complete `FormState` into the named configuration artifacts the
//! pipeline host imports. Assembly is pure and synchronous: identical state
//! renders byte-identical artifacts (keys sorted, 4-space indent), and a
//! state that fails validation produces no artifacts at all.

pub mod archive;
pub mod import;
pub mod validate;

pub use validate::{Severity, Strictness, ValidationIssue, ValidationReport};

use crate::error::{ForgeError, ForgeResult};
use crate::workflow::FormState;
use serde::Serialize;
use serde_json::Value;

/// Parameter description imported by the pipeline host
pub const DYNAMO_FILE: &str = "process-dynamo.json";

/// Form layout for rendering the same inputs elsewhere
pub const FORM_FILE: &str = "process-form.json";

/// Manifest of expected input bindings
pub const INPUT_FILE: &str = "process-input.json";

/// Manifest of produced output data
pub const OUTPUT_FILE: &str = "process-output.json";

/// Executor compute configuration, carried verbatim
pub const COMPUTE_FILE: &str = "process-compute.config";

/// Preprocessing script run before the workflow launches
pub const PREPROCESS_FILE: &str = "preprocess.py";

/// Every artifact file name, in bundle order
pub const ARTIFACT_FILES: [&str; 6] = [
    DYNAMO_FILE,
    FORM_FILE,
    INPUT_FILE,
    OUTPUT_FILE,
    COMPUTE_FILE,
    PREPROCESS_FILE,
];

/// One rendered configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Exact file name the pipeline host imports
    pub file_name: &'static str,

    /// Rendered contents
    pub contents: String,
}

/// The rendered configuration files, in bundle order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBundle {
    artifacts: Vec<Artifact>,
}

impl ConfigBundle {
    /// Render all artifacts from the current form state
    ///
    /// No validation happens here; use [`assemble`] to gate rendering on a
    /// clean validation pass.
    pub fn from_state(state: &FormState) -> ForgeResult<Self> {
        let doc = state.to_doc();

        let section = |key: &str| -> ForgeResult<String> {
            render_json(doc.get(key).unwrap_or(&Value::Null))
        };

        let artifacts = vec![
            Artifact {
                file_name: DYNAMO_FILE,
                contents: section("dynamo")?,
            },
            Artifact {
                file_name: FORM_FILE,
                contents: section("form")?,
            },
            Artifact {
                file_name: INPUT_FILE,
                contents: section("input")?,
            },
            Artifact {
                file_name: OUTPUT_FILE,
                contents: section("output")?,
            },
            Artifact {
                file_name: COMPUTE_FILE,
                contents: state.compute.clone(),
            },
            Artifact {
                file_name: PREPROCESS_FILE,
                contents: state.preprocess.clone(),
            },
        ];

        Ok(Self { artifacts })
    }

    /// All artifacts, in bundle order
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// Look up one artifact by file name
    pub fn get(&self, file_name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.file_name == file_name)
    }
}

/// Validate the form state and render the bundle
///
/// Validation errors block assembly; the caller is expected to have shown the
/// report from [`validate::validate`] when it needs field-level detail.
pub fn assemble(state: &FormState, strictness: Strictness) -> ForgeResult<ConfigBundle> {
    let report = validate::validate(state, strictness);
    if report.has_errors() {
        return Err(ForgeError::ValidationFailed(report.errors().count()));
    }

    ConfigBundle::from_state(state)
}

/// Render JSON with sorted keys and 4-space indentation
///
/// Key order comes from the map representation; the indent matches what the
/// pipeline host's own tooling emits.
pub fn render_json(value: &Value) -> ForgeResult<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;

    String::from_utf8(buf).map_err(|e| ForgeError::Internal(format!("rendering JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{params::new_form_param, ColumnSpec, Delimiter, OutputSpec};
    use serde_json::json;

    fn valid_state() -> FormState {
        let mut state = FormState::default();
        state.source.id = "rnaseq".to_string();
        state.source.name = "RNA-seq".to_string();
        state.params.push(new_form_param("input_type"));
        state.outputs.push(OutputSpec {
            name: "Counts".to_string(),
            desc: "Gene counts".to_string(),
            source: "counts.tsv".to_string(),
            delimiter: Delimiter::Tab,
            columns: vec![ColumnSpec {
                col: "gene_id".to_string(),
                name: "Gene ID".to_string(),
                desc: String::new(),
            }],
            ..OutputSpec::default()
        });
        state
    }

    #[test]
    fn assemble_produces_every_artifact() {
        let bundle = assemble(&valid_state(), Strictness::Strict).unwrap();

        assert_eq!(bundle.artifacts().len(), ARTIFACT_FILES.len());
        for file_name in ARTIFACT_FILES {
            let artifact = bundle.get(file_name).unwrap();
            if file_name.ends_with(".json") {
                assert!(!artifact.contents.is_empty());
            }
        }
    }

    #[test]
    fn assembly_is_deterministic() {
        let state = valid_state();
        let first = assemble(&state, Strictness::Strict).unwrap();
        let second = assemble(&state, Strictness::Strict).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_field_produces_no_bundle() {
        let mut state = valid_state();
        state.source.desc = String::new();

        let err = assemble(&state, Strictness::Strict).unwrap_err();
        assert!(matches!(err, ForgeError::ValidationFailed(1)));
    }

    #[test]
    fn form_references_exist_in_input_manifest() {
        let bundle = assemble(&valid_state(), Strictness::Strict).unwrap();

        let form: Value =
            serde_json::from_str(&bundle.get(FORM_FILE).unwrap().contents).unwrap();
        let input: Value =
            serde_json::from_str(&bundle.get(INPUT_FILE).unwrap().contents).unwrap();

        let leaves = form["form"]["properties"].as_object().unwrap();
        for key in leaves.keys() {
            assert!(
                input.get(key).is_some(),
                "form key {} missing from input manifest",
                key
            );
        }
        assert_eq!(
            input["input_type"],
            "$.params.dataset.paramJson.input_type"
        );
    }

    #[test]
    fn dynamo_artifact_carries_workflow_identity() {
        let bundle = assemble(&valid_state(), Strictness::Strict).unwrap();
        let dynamo: Value =
            serde_json::from_str(&bundle.get(DYNAMO_FILE).unwrap().contents).unwrap();

        assert_eq!(dynamo["id"], "rnaseq");
        assert_eq!(dynamo["executor"], "NEXTFLOW");
        assert_eq!(dynamo["code"]["script"], "main.nf");
    }

    #[test]
    fn render_json_sorts_keys_and_indents() {
        let rendered = render_json(&json!({"b": 1, "a": {"z": 2, "y": 3}})).unwrap();
        assert_eq!(
            rendered,
            "{\n    \"a\": {\n        \"y\": 3,\n        \"z\": 2\n    },\n    \"b\": 1\n}"
        );
    }
}
