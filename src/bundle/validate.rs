//! Validation of form state before assembly
//!
//! Issues never mutate state; they name the offending field and block export
//! while any error remains. Cross-artifact consistency (the form tree and the
//! input manifest agreeing) is checked at the configured strictness.

use crate::workflow::{params, FormState, ParamInput};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// How cross-artifact issues are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Cross-artifact issues block export
    #[default]
    Strict,

    /// Cross-artifact issues are reported as warnings only
    Lenient,
}

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One validation finding, anchored to a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted path of the offending field
    pub field: String,

    /// What is missing or malformed
    pub message: String,

    pub severity: Severity,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Collected findings for one validation pass
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>, severity: Severity) {
        self.issues.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
            severity,
        });
    }

    /// All findings, errors first
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Findings that block export
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
    }

    /// Findings reported but not blocking
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    /// Whether any finding blocks export
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Whether the pass found nothing at all
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Validate the complete form state
pub fn validate(state: &FormState, strictness: Strictness) -> ValidationReport {
    let mut report = ValidationReport::default();
    let cross = match strictness {
        Strictness::Strict => Severity::Error,
        Strictness::Lenient => Severity::Warning,
    };

    check_source(state, &mut report);
    check_params(state, &mut report);
    check_outputs(state, &mut report);
    check_form_consistency(state, cross, &mut report);

    report.issues.sort_by_key(|i| i.severity == Severity::Warning);
    report
}

fn check_source(state: &FormState, report: &mut ValidationReport) {
    let source = &state.source;

    if source.id.is_empty() {
        report.push("dynamo.id", "workflow ID is required", Severity::Error);
    } else if !source.id_is_valid() {
        report.push(
            "dynamo.id",
            "must be all lowercase alphanumeric with dashes",
            Severity::Error,
        );
    }

    for (field, value, what) in [
        ("dynamo.name", &source.name, "workflow name"),
        ("dynamo.desc", &source.desc, "workflow description"),
        ("dynamo.code.uri", &source.code.uri, "repository path"),
        ("dynamo.code.script", &source.code.script, "entrypoint script"),
        ("dynamo.code.version", &source.code.version, "repository version"),
    ] {
        if value.is_empty() {
            report.push(field, format!("{} is required", what), Severity::Error);
        }
    }
}

fn check_params(state: &FormState, report: &mut ValidationReport) {
    let mut seen: HashSet<&str> = HashSet::new();

    for (ix, param) in state.params.iter().enumerate() {
        if param.id.is_empty() {
            report.push(
                format!("params[{}].id", ix),
                "parameter ID is required",
                Severity::Error,
            );
            continue;
        }
        if param.id.contains(char::is_whitespace) {
            report.push(
                format!("params.{}", param.id),
                "parameter ID must not contain spaces",
                Severity::Error,
            );
        }
        if !seen.insert(&param.id) {
            report.push(
                format!("params.{}", param.id),
                "duplicate parameter ID",
                Severity::Error,
            );
        }

        if let ParamInput::Hardcoded { value } = &param.input {
            if value.is_empty() {
                report.push(
                    format!("params.{}", param.id),
                    "hardcoded value is empty",
                    Severity::Warning,
                );
            }
        }
    }
}

fn check_outputs(state: &FormState, report: &mut ValidationReport) {
    for (ix, output) in state.outputs.iter().enumerate() {
        for (key, value, what) in [
            ("name", &output.name, "display name"),
            ("desc", &output.desc, "description"),
            ("source", &output.source, "file path"),
        ] {
            if value.is_empty() {
                report.push(
                    format!("outputs[{}].{}", ix, key),
                    format!("please provide {}", what),
                    Severity::Error,
                );
            }
        }

        if output.columns.is_empty() {
            report.push(
                format!("outputs[{}].cols", ix),
                "please define the file columns",
                Severity::Error,
            );
        }
    }
}

/// Confirm every form-entry parameter owns the form-tree node at its path
///
/// The tree is rebuilt first-wins, so two parameters claiming overlapping
/// paths leave one of them without its element. That parameter would render a
/// launch form that disagrees with the input manifest.
fn check_form_consistency(state: &FormState, severity: Severity, report: &mut ValidationReport) {
    let (_, tree) = params::dump_params(&state.params);

    for param in &state.params {
        let ParamInput::Form { key_path, element } = &param.input else {
            continue;
        };

        let mut pointer = Some(&tree);
        for key in key_path {
            pointer = pointer
                .and_then(|node| node.get("properties"))
                .and_then(|props| props.get(key));
        }

        let owns_node = pointer.is_some_and(|node| *node == element.schema_node());
        if !owns_node {
            report.push(
                format!("params.{}", param.id),
                format!(
                    "form entry at '{}' conflicts with another parameter's form placement",
                    key_path.join(".")
                ),
                severity,
            );
        }
    }
}
