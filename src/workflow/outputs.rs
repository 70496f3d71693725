//! Output files
//!
//! Each output describes one delimited file produced by the workflow and how
//! the platform ingests it (`hot.Parquet` command). Path segments wrapped in
//! `[Token]` mark families of files concatenated into one table; a fixed
//! `hot.Manifest` command always closes the list.

use crate::error::ForgeResult;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::OnceLock;

/// Prefix under which output files live in the data directory
pub const SOURCE_PREFIX: &str = "$data_directory/";

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[([A-Za-z]+)\]").unwrap_or_else(|_| unreachable!()))
}

/// Value separator within an output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    /// The separator character written to the ingest command
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comma => ",",
            Self::Tab => "\t",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Comma => "Comma",
            Self::Tab => "Tab",
        }
    }

    /// Parse a separator character, defaulting to comma
    pub fn from_char(s: &str) -> Self {
        if s == "\t" {
            Self::Tab
        } else {
            Self::Comma
        }
    }
}

/// One column of an output file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Value in the header row
    pub col: String,

    /// Name presented to the user
    pub name: String,

    /// Longer description of the column's data
    #[serde(default)]
    pub desc: String,
}

/// Naming for one melt axis (column headers or table values)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeltAxis {
    pub name: String,

    #[serde(default)]
    pub desc: String,
}

/// Melt the columns not covered by `cols` into key/value rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeltSpec {
    /// Naming for the data held in column headers
    pub key: MeltAxis,

    /// Naming for the data held in table values
    pub value: MeltAxis,
}

/// Naming for one `[Token]` in the source path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcatToken {
    pub token: String,
    pub name: String,

    #[serde(default)]
    pub desc: String,
}

/// One delimited output file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    /// Name presented to the user
    pub name: String,

    /// Longer description presented to the user
    #[serde(default)]
    pub desc: String,

    /// File location within the output directory (no `$data_directory/` prefix)
    pub source: String,

    /// Optional webpage documenting the file contents
    #[serde(default)]
    pub url: String,

    /// Value separator
    pub delimiter: Delimiter,

    /// Described columns
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,

    /// Optional melt of the remaining columns
    #[serde(default)]
    pub melt: Option<MeltSpec>,

    /// Naming for the tokens in the source path
    #[serde(default)]
    pub concat: Vec<ConcatToken>,
}

impl Default for OutputSpec {
    fn default() -> Self {
        Self {
            name: "Output File".to_string(),
            desc: String::new(),
            source: String::new(),
            url: String::new(),
            delimiter: Delimiter::Comma,
            columns: vec![],
            melt: None,
            concat: vec![],
        }
    }
}

impl OutputSpec {
    /// Tokens present in the source path
    pub fn tokens(&self) -> Vec<String> {
        token_pattern()
            .captures_iter(&self.source)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Ingest target, derived from the source path
    pub fn target(&self) -> String {
        format!("{}.parquet", self.source.replace('/', "_"))
    }

    /// Rebuild the concat list from the current tokens
    ///
    /// Naming already entered for a token is kept; new tokens default their
    /// name and description to the token itself.
    pub fn sync_concat(&mut self) {
        let existing: Vec<ConcatToken> = std::mem::take(&mut self.concat);
        self.concat = self
            .tokens()
            .into_iter()
            .map(|token| {
                existing
                    .iter()
                    .find(|c| c.token == token)
                    .cloned()
                    .unwrap_or_else(|| ConcatToken {
                        name: token.clone(),
                        desc: token.clone(),
                        token,
                    })
            })
            .collect();
    }

    /// Whether this output's source is matched by another output's token pattern
    pub fn matches_pattern(&self, token_source: &str) -> bool {
        let pattern = token_pattern().replace_all(token_source, "(.*)");
        match Regex::new(&pattern) {
            Ok(re) => re.is_match(&self.source),
            Err(_) => false,
        }
    }

    /// Parse a `hot.Parquet` ingest command; other commands yield `None`
    pub fn from_command(command: &Value) -> Option<Self> {
        if command.get("command").and_then(Value::as_str) != Some("hot.Parquet") {
            return None;
        }

        let params = command.get("params");
        let text = |key: &str, fallback: &str| -> String {
            params
                .and_then(|p| p.get(key))
                .and_then(Value::as_str)
                .unwrap_or(fallback)
                .to_string()
        };

        let source = text("source", SOURCE_PREFIX);
        let source = source.strip_prefix(SOURCE_PREFIX).unwrap_or(&source).to_string();

        let delimiter = params
            .and_then(|p| p.get("read_csv"))
            .and_then(|r| r.get("parse"))
            .and_then(|p| p.get("delimiter"))
            .and_then(Value::as_str)
            .map(Delimiter::from_char)
            .unwrap_or(Delimiter::Comma);

        let columns: Vec<ColumnSpec> = params
            .and_then(|p| p.get("cols"))
            .and_then(|c| serde_json::from_value(c.clone()).ok())
            .unwrap_or_default();

        let melt: Option<MeltSpec> = command
            .get("melt")
            .and_then(|m| serde_json::from_value(m.clone()).ok());

        // Concat naming historically ended up in either location
        let concat: Vec<ConcatToken> = command
            .get("concat")
            .or_else(|| params.and_then(|p| p.get("concat")))
            .and_then(|c| serde_json::from_value(c.clone()).ok())
            .unwrap_or_default();

        let mut output = Self {
            name: text("name", "Output File"),
            desc: text("desc", ""),
            source,
            url: text("url", ""),
            delimiter,
            columns,
            melt,
            concat,
        };
        output.sync_concat();
        Some(output)
    }

    /// Render the `hot.Parquet` ingest command
    pub fn to_command(&self) -> Value {
        let mut command = json!({
            "command": "hot.Parquet",
            "params": {
                "name": self.name,
                "desc": self.desc,
                "url": self.url,
                "source": format!("{}{}", SOURCE_PREFIX, self.source),
                "target": self.target(),
                "read_csv": {
                    "parse": { "delimiter": self.delimiter.as_str() },
                },
                "cols": self.columns,
            },
        });

        if let Some(melt) = &self.melt {
            command["melt"] = json!(melt);
        }
        if !self.concat.is_empty() {
            command["concat"] = json!(self.concat);
        }

        command
    }
}

/// The fixed manifest command closing every output list
pub fn manifest_command() -> Value {
    json!({ "command": "hot.Manifest", "params": {} })
}

/// Load the output specs from a document
///
/// Non-parquet commands are dropped, and outputs whose source is matched by
/// another output's token pattern are pruned (the tokenized family already
/// covers them).
pub fn load_outputs(doc: &Value) -> ForgeResult<Vec<OutputSpec>> {
    let outputs: Vec<OutputSpec> = doc
        .get("output")
        .and_then(|o| o.get("commands"))
        .and_then(Value::as_array)
        .map(|commands| commands.iter().filter_map(OutputSpec::from_command).collect())
        .unwrap_or_default();

    Ok(prune_token_matches(outputs))
}

/// Render the `output` section for a set of specs
pub fn dump_outputs(outputs: &[OutputSpec]) -> Value {
    let mut commands: Vec<Value> = outputs.iter().map(OutputSpec::to_command).collect();
    commands.push(manifest_command());
    json!({ "commands": commands })
}

fn prune_token_matches(mut outputs: Vec<OutputSpec>) -> Vec<OutputSpec> {
    loop {
        let mut matched: Option<Vec<usize>> = None;

        for (i, output) in outputs.iter().enumerate() {
            if output.tokens().is_empty() {
                continue;
            }
            let matching: Vec<usize> = outputs
                .iter()
                .enumerate()
                .filter(|(j, other)| *j != i && other.matches_pattern(&output.source))
                .map(|(j, _)| j)
                .collect();
            if !matching.is_empty() {
                matched = Some(matching);
                break;
            }
        }

        match matched {
            Some(indices) => {
                outputs = outputs
                    .into_iter()
                    .enumerate()
                    .filter(|(j, _)| !indices.contains(j))
                    .map(|(_, output)| output)
                    .collect();
            }
            None => return outputs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OutputSpec {
        OutputSpec {
            name: "Gene Counts".to_string(),
            desc: "Counts per gene".to_string(),
            source: "counts/genes.tsv".to_string(),
            delimiter: Delimiter::Tab,
            columns: vec![ColumnSpec {
                col: "gene_id".to_string(),
                name: "Gene ID".to_string(),
                desc: String::new(),
            }],
            ..OutputSpec::default()
        }
    }

    #[test]
    fn target_derivation() {
        assert_eq!(sample().target(), "counts_genes.tsv.parquet");
    }

    #[test]
    fn tokens_extracted_from_source() {
        let mut output = sample();
        output.source = "per_sample/[Sample]/stats.[Metric].csv".to_string();
        assert_eq!(output.tokens(), vec!["Sample".to_string(), "Metric".to_string()]);
    }

    #[test]
    fn sync_concat_keeps_entered_naming() {
        let mut output = sample();
        output.source = "per_sample/[Sample]/stats.csv".to_string();
        output.sync_concat();
        assert_eq!(output.concat.len(), 1);
        assert_eq!(output.concat[0].name, "Sample");

        output.concat[0].name = "Sample Name".to_string();
        output.source = "per_sample/[Sample]/stats.[Metric].csv".to_string();
        output.sync_concat();
        assert_eq!(output.concat[0].name, "Sample Name");
        assert_eq!(output.concat[1].token, "Metric");
    }

    #[test]
    fn command_round_trip() {
        let mut output = sample();
        output.melt = Some(MeltSpec {
            key: MeltAxis {
                name: "Sample".to_string(),
                desc: "Sample the values belong to".to_string(),
            },
            value: MeltAxis {
                name: "Count".to_string(),
                desc: String::new(),
            },
        });

        let command = output.to_command();
        assert_eq!(command["params"]["source"], "$data_directory/counts/genes.tsv");
        assert_eq!(command["params"]["read_csv"]["parse"]["delimiter"], "\t");

        let parsed = OutputSpec::from_command(&command).unwrap();
        assert_eq!(parsed, output);
    }

    #[test]
    fn non_parquet_commands_are_dropped() {
        assert!(OutputSpec::from_command(&manifest_command()).is_none());
    }

    #[test]
    fn dump_appends_manifest_command() {
        let section = dump_outputs(&[sample()]);
        let commands = section["commands"].as_array().unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[1]["command"], "hot.Manifest");
    }

    #[test]
    fn load_prunes_outputs_matched_by_token_pattern() {
        let mut family = sample();
        family.source = "per_sample/[Sample]/stats.csv".to_string();
        family.sync_concat();

        let mut individual = sample();
        individual.name = "One Sample".to_string();
        individual.source = "per_sample/sampleA/stats.csv".to_string();

        let doc = json!({ "output": dump_outputs(&[family.clone(), individual]) });
        let loaded = load_outputs(&doc).unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].source, family.source);
    }

    #[test]
    fn unrelated_outputs_survive_pruning() {
        let mut family = sample();
        family.source = "per_sample/[Sample]/stats.csv".to_string();
        family.sync_concat();

        let mut other = sample();
        other.name = "Summary".to_string();
        other.source = "summary.csv".to_string();

        let doc = json!({ "output": dump_outputs(&[family, other]) });
        let loaded = load_outputs(&doc).unwrap();
        assert_eq!(loaded.len(), 2);
    }
}
