//! Error types for flowforge
//!
//! All modules use `ForgeResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for flowforge operations
pub type ForgeResult<T> = Result<T, ForgeError>;

/// All errors that can occur in flowforge
#[derive(Error, Debug)]
pub enum ForgeError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Session errors
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Failed to persist session state: {0}")]
    SessionPersist(String),

    #[error("Nothing to {0}")]
    HistoryEmpty(&'static str),

    // Catalog errors
    #[error("Pipeline catalog unavailable: {reason}")]
    CatalogUnavailable { reason: String },

    #[error("Unknown {kind} in catalog: {name}")]
    CatalogEntryNotFound { kind: &'static str, name: String },

    // Assembly errors
    #[error("Configuration has {0} validation error(s)")]
    ValidationFailed(usize),

    #[error("Unknown artifact: {0}")]
    ArtifactUnknown(String),

    #[error("Did not expect input file: {0}")]
    ImportUnexpectedFile(String),

    #[error("Archive error: {0}")]
    Archive(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl ForgeError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CatalogUnavailable { .. } => {
                Some("Run: flowforge session refresh (clears cached lookups)")
            }
            Self::ValidationFailed(_) => Some("Run: flowforge validate (lists every issue)"),
            Self::ImportUnexpectedFile(_) => Some(
                "Expected process-dynamo.json, process-form.json, process-input.json, \
                 process-output.json, process-compute.config, or preprocess.py",
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ForgeError::SessionNotFound("demo".to_string());
        assert!(err.to_string().contains("demo"));
    }

    #[test]
    fn error_hint() {
        let err = ForgeError::CatalogUnavailable {
            reason: "parse failure".to_string(),
        };
        assert_eq!(
            err.hint(),
            Some("Run: flowforge session refresh (clears cached lookups)")
        );
        assert!(ForgeError::PathNotFound(PathBuf::from("/x")).hint().is_none());
    }

    #[test]
    fn history_empty_names_direction() {
        assert_eq!(
            ForgeError::HistoryEmpty("undo").to_string(),
            "Nothing to undo"
        );
    }
}
