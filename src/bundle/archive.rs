//! Bundle archive packing

use crate::bundle::ConfigBundle;
use crate::error::{ForgeError, ForgeResult};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Default archive file name
pub const DEFAULT_ARCHIVE_NAME: &str = "pipeline-configuration.zip";

/// Pack every artifact of a bundle into one ZIP archive
pub fn write_archive(bundle: &ConfigBundle) -> ForgeResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for artifact in bundle.artifacts() {
        writer
            .start_file(artifact.file_name, options)
            .map_err(|e| ForgeError::Archive(e.to_string()))?;
        writer
            .write_all(artifact.contents.as_bytes())
            .map_err(|e| ForgeError::Archive(e.to_string()))?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| ForgeError::Archive(e.to_string()))?;

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{assemble, Strictness, ARTIFACT_FILES};
    use crate::workflow::{ColumnSpec, Delimiter, FormState, OutputSpec};
    use std::io::Read;
    use zip::ZipArchive;

    fn valid_state() -> FormState {
        let mut state = FormState::default();
        state.source.id = "rnaseq".to_string();
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
    fn archive_holds_every_artifact() {
        let bundle = assemble(&valid_state(), Strictness::Strict).unwrap();
        let bytes = write_archive(&bundle).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), ARTIFACT_FILES.len());

        let mut entry = archive.by_name("process-dynamo.json").unwrap();
        let mut contents = String::new();
        entry.read_to_string(&mut contents).unwrap();
        assert!(contents.contains("\"id\": \"rnaseq\""));
    }

    #[test]
    fn archive_entries_match_bundle_contents() {
        let bundle = assemble(&valid_state(), Strictness::Strict).unwrap();
        let bytes = write_archive(&bundle).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        for artifact in bundle.artifacts() {
            let mut entry = archive.by_name(artifact.file_name).unwrap();
            let mut contents = String::new();
            entry.read_to_string(&mut contents).unwrap();
            assert_eq!(contents, artifact.contents, "{}", artifact.file_name);
        }
    }
}
