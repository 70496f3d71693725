//! Declarative form fields
//!
//! Scalar form pages are described as a list of `FieldSpec` values and
//! rendered by a single loop over that list. Adding a field to a page means
//! adding an entry to the list, not another prompt call site.

use serde::{Deserialize, Serialize};

/// How a field is entered
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Free-form text
    Text,

    /// One of a fixed set of options
    Select { options: Vec<String> },

    /// Any subset of a fixed set of options
    MultiSelect { options: Vec<String> },

    /// Yes/no switch
    Toggle,

    /// Whole number
    Integer,

    /// Decimal number
    Number,
}

/// A field's current (or newly entered) value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Toggle(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Toggle state, if this is a toggle value
    pub fn as_toggle(&self) -> Option<bool> {
        match self {
            Self::Toggle(b) => Some(*b),
            _ => None,
        }
    }

    /// Selected options, if this is a list value
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Toggle(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
            Self::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

/// One entry in a page's field list
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Stable key the page applies the entered value under
    pub key: &'static str,

    /// Title shown to the user
    pub title: String,

    /// Longer help line
    pub help: String,

    /// Entry widget
    pub kind: FieldKind,

    /// Current value, used as the prompt's initial state
    pub value: FieldValue,
}

impl FieldSpec {
    /// Free-form text field
    pub fn text(key: &'static str, title: &str, help: &str, value: &str) -> Self {
        Self {
            key,
            title: title.to_string(),
            help: help.to_string(),
            kind: FieldKind::Text,
            value: FieldValue::Text(value.to_string()),
        }
    }

    /// Single-choice field
    pub fn select(key: &'static str, title: &str, help: &str, options: Vec<String>, value: &str) -> Self {
        Self {
            key,
            title: title.to_string(),
            help: help.to_string(),
            kind: FieldKind::Select { options },
            value: FieldValue::Text(value.to_string()),
        }
    }

    /// Multiple-choice field
    pub fn multi_select(
        key: &'static str,
        title: &str,
        help: &str,
        options: Vec<String>,
        value: Vec<String>,
    ) -> Self {
        Self {
            key,
            title: title.to_string(),
            help: help.to_string(),
            kind: FieldKind::MultiSelect { options },
            value: FieldValue::List(value),
        }
    }

    /// Yes/no field
    pub fn toggle(key: &'static str, title: &str, help: &str, value: bool) -> Self {
        Self {
            key,
            title: title.to_string(),
            help: help.to_string(),
            kind: FieldKind::Toggle,
            value: FieldValue::Toggle(value),
        }
    }
}
