//! Import of previously exported artifacts
//!
//! Named files are read back into the configuration document, then the
//! document is reparsed into form state. Files whose names do not belong to
//! the bundle are rejected by name.

use crate::bundle::{COMPUTE_FILE, DYNAMO_FILE, FORM_FILE, INPUT_FILE, OUTPUT_FILE, PREPROCESS_FILE};
use crate::error::{ForgeError, ForgeResult};
use crate::workflow::FormState;
use serde_json::{json, Value};
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Apply one named artifact file to a configuration document
pub fn apply_artifact(doc: &mut Value, file_name: &str, contents: &[u8]) -> ForgeResult<()> {
    let text = || String::from_utf8_lossy(contents).to_string();

    match file_name {
        PREPROCESS_FILE => doc["preprocess"] = json!(text()),
        COMPUTE_FILE => doc["compute"] = json!(text()),
        DYNAMO_FILE | FORM_FILE | INPUT_FILE | OUTPUT_FILE => {
            let key = file_name
                .trim_start_matches("process-")
                .trim_end_matches(".json");
            doc[key] = serde_json::from_slice(contents)?;
        }
        other => return Err(ForgeError::ImportUnexpectedFile(other.to_string())),
    }

    Ok(())
}

/// Load artifact files into the form state
///
/// Returns the file names applied, in the order given. The state is only
/// replaced once every file has parsed, so a bad file leaves it untouched.
pub async fn import_files(state: &mut FormState, paths: &[impl AsRef<Path>]) -> ForgeResult<Vec<String>> {
    let mut doc = state.to_doc();
    let mut applied = Vec::with_capacity(paths.len());

    for path in paths {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ForgeError::PathNotFound(path.to_path_buf()))?;

        let contents = fs::read(path)
            .await
            .map_err(|e| ForgeError::io(format!("reading {}", path.display()), e))?;

        apply_artifact(&mut doc, file_name, &contents)?;
        debug!("Applied {}", file_name);
        applied.push(file_name.to_string());
    }

    *state = FormState::from_doc(&doc)?;
    Ok(applied)
}
