//! Workflow form state
//!
//! `FormState` is the single aggregate of everything the user has entered
//! across the form pages. The document representation (`to_doc`/`from_doc`)
//! is the raw configuration the artifacts are rendered from; it can be
//! regenerated from the state at any time and round-trips through import.

pub mod fields;
pub mod history;
pub mod outputs;
pub mod params;
pub mod source;

pub use fields::{FieldKind, FieldSpec, FieldValue};
pub use history::History;
pub use outputs::{ColumnSpec, Delimiter, MeltSpec, OutputSpec};
pub use params::{FormElement, Param, ParamInput, ValueType};
pub use source::{Executor, Repository, SourceState};

use crate::error::ForgeResult;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Preprocessing script a fresh session starts from
pub const DEFAULT_PREPROCESS: &str = r#"#!/usr/bin/env python3
"""Adjust dataset parameters before the workflow launches."""

import json

# The pipeline host writes the launch parameters alongside this script
with open("params.json") as handle:
    params = json.load(handle)

# Make any adjustments needed before the workflow starts here

with open("params.json", "w") as handle:
    json.dump(params, handle, indent=4)
"#;

/// Field values accumulated across the form pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormState {
    /// Workflow identity page
    pub source: SourceState,

    /// Input parameters page
    pub params: Vec<Param>,

    /// Output files page
    pub outputs: Vec<OutputSpec>,

    /// Passthrough `ui` block of the form artifact
    pub form_ui: Value,

    /// Passthrough compute configuration
    pub compute: String,

    /// Preprocessing script
    pub preprocess: String,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            source: SourceState::default(),
            params: vec![],
            outputs: vec![],
            form_ui: json!({}),
            compute: String::new(),
            preprocess: DEFAULT_PREPROCESS.to_string(),
        }
    }
}

impl FormState {
    /// Render the raw configuration document
    pub fn to_doc(&self) -> Value {
        let (input, form_tree) = params::dump_params(&self.params);

        json!({
            "dynamo": self.source.dump(),
            "form": { "form": form_tree, "ui": self.form_ui },
            "input": input,
            "output": outputs::dump_outputs(&self.outputs),
            "compute": self.compute,
            "preprocess": self.preprocess,
        })
    }

    /// Parse a configuration document back into editable state
    pub fn from_doc(doc: &Value) -> ForgeResult<Self> {
        Ok(Self {
            source: SourceState::from_doc(doc)?,
            params: params::load_params(doc)?,
            outputs: outputs::load_outputs(doc)?,
            form_ui: doc
                .get("form")
                .and_then(|f| f.get("ui"))
                .cloned()
                .unwrap_or_else(|| json!({})),
            compute: doc
                .get("compute")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            preprocess: doc
                .get("preprocess")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated_state() -> FormState {
        let mut state = FormState::default();
        state.source.id = "my-rnaseq".to_string();
        state.params.push(params::new_form_param("genome"));
        state.params.push(Param {
            id: "input_dir".to_string(),
            input: ParamInput::InputDirectory,
        });
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
    fn document_round_trip() {
        let state = populated_state();
        let doc = state.to_doc();
        let restored = FormState::from_doc(&doc).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn document_is_deterministic() {
        let state = populated_state();
        assert_eq!(state.to_doc(), state.to_doc());
    }

    #[test]
    fn document_sections_present() {
        let doc = FormState::default().to_doc();
        for key in ["dynamo", "form", "input", "output", "compute", "preprocess"] {
            assert!(doc.get(key).is_some(), "missing section {}", key);
        }
        assert_eq!(doc["output"]["commands"][0]["command"], "hot.Manifest");
    }
}
