//! Input parameters
//!
//! Each parameter binds a key in the `input` manifest to either a value the
//! platform fills in (dataset name, input/output directory), a hardcoded
//! string, or a form entry the end user completes. Form entries also place a
//! schema node at their dotted key path inside the `form` tree.

use crate::error::{ForgeError, ForgeResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Binding filled with the name of the new dataset
pub const DATASET_NAME_BINDING: &str = "$.params.dataset.name";

/// Binding filled with the base URL of the input dataset's files
pub const INPUT_DIRECTORY_BINDING: &str = "$.params.inputs[0].s3|/data/";

/// Binding filled with the base URL of the output dataset
pub const OUTPUT_DIRECTORY_BINDING: &str = "$.params.dataset.s3|/data/";

/// Prefix of bindings that reference a form entry
pub const FORM_BINDING_PREFIX: &str = "$.params.dataset.paramJson.";

/// JSON-schema value types a user-provided form entry accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Array,
    Boolean,
    Integer,
    Number,
    String,
}

impl ValueType {
    /// All value types, in display order
    pub fn all() -> [ValueType; 5] {
        [
            Self::Array,
            Self::Boolean,
            Self::Integer,
            Self::Number,
            Self::String,
        ]
    }

    /// Display label (matches the serialized form)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
        }
    }

    /// Parse a label, defaulting to string
    pub fn from_label(label: &str) -> Self {
        match label {
            "array" => Self::Array,
            "boolean" => Self::Boolean,
            "integer" => Self::Integer,
            "number" => Self::Number,
            _ => Self::String,
        }
    }

    /// The zero value used as default when the type changes
    pub fn zero(&self) -> Value {
        match self {
            Self::Array => json!([]),
            Self::Boolean => json!(false),
            Self::Integer => json!(0),
            Self::Number => json!(0.0),
            Self::String => json!(""),
        }
    }
}

/// The form element shown for a form-entry parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form_type", rename_all = "snake_case")]
pub enum FormElement {
    /// Plain form widget; the user types a value of the declared type
    UserValue {
        value_type: ValueType,
        default: Value,
        title: String,
        description: String,
    },

    /// The user selects an existing dataset of the given process type
    Dataset {
        process: String,
        title: String,
        description: String,
    },

    /// The user selects file(s) from the input dataset matching a glob
    InputFile {
        file: String,
        multiple: bool,
        title: String,
        description: String,
    },

    /// The user selects a reference object uploaded to their project
    Reference {
        directory: String,
        save_as: String,
        title: String,
        description: String,
    },
}

impl FormElement {
    /// Display label for the element kind
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::UserValue { .. } => "User-Provided Value",
            Self::Dataset { .. } => "Dataset",
            Self::InputFile { .. } => "Input File",
            Self::Reference { .. } => "Reference",
        }
    }

    /// Title shown in the form
    pub fn title(&self) -> &str {
        match self {
            Self::UserValue { title, .. }
            | Self::Dataset { title, .. }
            | Self::InputFile { title, .. }
            | Self::Reference { title, .. } => title,
        }
    }

    /// Description shown in the form
    pub fn description(&self) -> &str {
        match self {
            Self::UserValue { description, .. }
            | Self::Dataset { description, .. }
            | Self::InputFile { description, .. }
            | Self::Reference { description, .. } => description,
        }
    }

    /// Replace the title and description, keeping the rest of the element
    pub fn with_naming(mut self, new_title: String, new_description: String) -> Self {
        match &mut self {
            Self::UserValue {
                title, description, ..
            }
            | Self::Dataset {
                title, description, ..
            }
            | Self::InputFile {
                title, description, ..
            }
            | Self::Reference {
                title, description, ..
            } => {
                *title = new_title;
                *description = new_description;
            }
        }
        self
    }

    /// The reference file glob, `**/<directory>/**/<save_as>`
    pub fn reference_glob(directory: &str, save_as: &str) -> String {
        format!("**/{}/**/{}", directory, save_as)
    }

    /// Render the schema node placed in the form tree
    pub fn schema_node(&self) -> Value {
        match self {
            Self::UserValue {
                value_type,
                default,
                title,
                description,
            } => json!({
                "type": value_type,
                "default": default,
                "title": title,
                "description": description,
            }),
            Self::Dataset {
                process,
                title,
                description,
            } => json!({
                "type": "string",
                "pathType": "dataset",
                "process": process,
                "title": title,
                "description": description,
            }),
            Self::InputFile {
                file,
                multiple,
                title,
                description,
            } => json!({
                "type": "string",
                "pathType": "dataset",
                "file": file,
                "multiple": multiple,
                "title": title,
                "description": description,
            }),
            Self::Reference {
                directory,
                save_as,
                title,
                description,
            } => json!({
                "type": "string",
                "pathType": "references",
                "file": Self::reference_glob(directory, save_as),
                "title": title,
                "description": description,
            }),
        }
    }

    /// Classify a schema node back into an element
    pub fn from_schema_node(id: &str, node: &Value) -> ForgeResult<Self> {
        let text = |key: &str| -> String {
            node.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let title = text("title");
        let description = text("description");

        match node.get("pathType").and_then(Value::as_str) {
            Some("dataset") => {
                if node.get("process").is_some() {
                    Ok(Self::Dataset {
                        process: text("process"),
                        title,
                        description,
                    })
                } else if node.get("file").is_some() {
                    Ok(Self::InputFile {
                        file: text("file"),
                        multiple: node
                            .get("multiple")
                            .and_then(Value::as_bool)
                            .unwrap_or(false),
                        title,
                        description,
                    })
                } else {
                    Err(ForgeError::User(format!(
                        "Expected 'process' or 'file' in form element for {}",
                        id
                    )))
                }
            }
            Some("references") => {
                let file = text("file");
                let rest = file.strip_prefix("**/").ok_or_else(|| {
                    ForgeError::User(format!(
                        "Reference file for {} must start with '**/': {}",
                        id, file
                    ))
                })?;
                let directory = rest.split('/').next().unwrap_or_default().to_string();
                let save_as = file.rsplit('/').next().unwrap_or_default().to_string();
                Ok(Self::Reference {
                    directory,
                    save_as,
                    title,
                    description,
                })
            }
            _ => {
                let value_type = node
                    .get("type")
                    .and_then(Value::as_str)
                    .map(ValueType::from_label)
                    .unwrap_or(ValueType::String);
                let default = node
                    .get("default")
                    .cloned()
                    .unwrap_or_else(|| value_type.zero());
                Ok(Self::UserValue {
                    value_type,
                    default,
                    title,
                    description,
                })
            }
        }
    }
}

/// How a parameter's value is determined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParamInput {
    /// Name of the new dataset, provided by the user at launch
    DatasetName,

    /// Base URL of the files making up the input dataset
    InputDirectory,

    /// Base URL of the dataset created for this workflow's outputs
    OutputDirectory,

    /// Fixed value baked into the configuration
    Hardcoded { value: String },

    /// Entry completed by the user in the launch form
    Form {
        key_path: Vec<String>,
        element: FormElement,
    },
}

impl ParamInput {
    /// Display label for the input kind
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::DatasetName => "Dataset Name",
            Self::InputDirectory => "Input Directory",
            Self::OutputDirectory => "Output Directory",
            Self::Hardcoded { .. } => "Hardcoded Value",
            Self::Form { .. } => "Form Entry",
        }
    }

    /// One-line description of the input kind, shown in the wizard
    pub fn kind_description(&self) -> &'static str {
        match self {
            Self::DatasetName => {
                "Populated with the name of the new dataset provided by the user"
            }
            Self::InputDirectory => {
                "Populated with the base URL of the files making up the input dataset"
            }
            Self::OutputDirectory => {
                "Populated with the base URL of the dataset created for the outputs"
            }
            Self::Hardcoded { .. } => "A hard-coded value",
            Self::Form { .. } => "Set by the user in the launch form",
        }
    }
}

/// One input parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// Unique key identifying the parameter (no spaces)
    pub id: String,

    /// How the value is determined
    pub input: ParamInput,
}

impl Param {
    /// The value written to the input manifest
    pub fn binding(&self) -> String {
        match &self.input {
            ParamInput::DatasetName => DATASET_NAME_BINDING.to_string(),
            ParamInput::InputDirectory => INPUT_DIRECTORY_BINDING.to_string(),
            ParamInput::OutputDirectory => OUTPUT_DIRECTORY_BINDING.to_string(),
            ParamInput::Hardcoded { value } => value.clone(),
            ParamInput::Form { key_path, .. } => {
                format!("{}{}", FORM_BINDING_PREFIX, key_path.join("."))
            }
        }
    }

    /// Classify an input-manifest value back into a parameter
    ///
    /// Form-entry bindings resolve their element from the form tree; missing
    /// nodes are synthesized as plain strings, matching how a hand-edited
    /// manifest is adopted.
    pub fn from_binding(id: &str, value: &str, form_tree: &Value) -> ForgeResult<Self> {
        let input = match value {
            DATASET_NAME_BINDING => ParamInput::DatasetName,
            INPUT_DIRECTORY_BINDING => ParamInput::InputDirectory,
            OUTPUT_DIRECTORY_BINDING => ParamInput::OutputDirectory,
            _ => match value.strip_prefix(FORM_BINDING_PREFIX) {
                Some(path) => {
                    let key_path: Vec<String> = path.split('.').map(str::to_string).collect();
                    let element = resolve_form_element(id, form_tree, &key_path)?;
                    ParamInput::Form { key_path, element }
                }
                None => ParamInput::Hardcoded {
                    value: value.to_string(),
                },
            },
        };

        Ok(Self {
            id: id.to_string(),
            input,
        })
    }

    /// Write this parameter into the input manifest and the form tree
    ///
    /// Form-tree nodes already present at the key path are left untouched, so
    /// the first parameter to claim a path wins.
    pub fn dump_into(&self, input: &mut Map<String, Value>, form_tree: &mut Value) {
        input.insert(self.id.clone(), Value::String(self.binding()));

        if let ParamInput::Form { key_path, element } = &self.input {
            let mut pointer = form_tree;
            for (ix, key) in key_path.iter().enumerate() {
                if !pointer.get("properties").is_some_and(Value::is_object) {
                    pointer["properties"] = json!({});
                }
                if let Some(props) = pointer["properties"].as_object_mut() {
                    if !props.contains_key(key) {
                        let node = if ix + 1 == key_path.len() {
                            element.schema_node()
                        } else {
                            json!({ "type": "object", "properties": {} })
                        };
                        props.insert(key.clone(), node);
                    }
                }

                pointer = &mut pointer["properties"][key];
            }
        }
    }
}

/// Walk the form tree to the element at the key path
///
/// Intermediate nodes missing from the tree are treated as objects; a missing
/// terminal node becomes a plain string defaulting to its own key.
fn resolve_form_element(id: &str, form_tree: &Value, key_path: &[String]) -> ForgeResult<FormElement> {
    let mut pointer = Some(form_tree);

    for key in key_path {
        pointer = pointer
            .and_then(|node| node.get("properties"))
            .and_then(|props| props.get(key));
    }

    match pointer {
        Some(node) => FormElement::from_schema_node(id, node),
        None => {
            let key = key_path.last().map(String::as_str).unwrap_or(id);
            Ok(FormElement::UserValue {
                value_type: ValueType::String,
                default: json!(key),
                title: key.to_string(),
                description: String::new(),
            })
        }
    }
}

/// Load all parameters from a document's input manifest
pub fn load_params(doc: &Value) -> ForgeResult<Vec<Param>> {
    let empty = Map::new();
    let input = doc
        .get("input")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let blank = json!({});
    let form_tree = doc
        .get("form")
        .and_then(|f| f.get("form"))
        .unwrap_or(&blank);

    let mut params = Vec::with_capacity(input.len());
    for (id, value) in input {
        let binding = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        params.push(Param::from_binding(id, &binding, form_tree)?);
    }
    Ok(params)
}

/// Render the input manifest and form tree for a set of parameters
pub fn dump_params(params: &[Param]) -> (Value, Value) {
    let mut input = Map::new();
    let mut form_tree = json!({});

    for param in params {
        param.dump_into(&mut input, &mut form_tree);
    }

    (Value::Object(input), form_tree)
}

/// First unused `param_N` id
pub fn next_param_id(params: &[Param]) -> String {
    let mut ix = 1;
    loop {
        let candidate = format!("param_{}", ix);
        if !params.iter().any(|p| p.id == candidate) {
            return candidate;
        }
        ix += 1;
    }
}

/// Fresh form-entry parameter rooted at its own id
pub fn new_form_param(id: &str) -> Param {
    Param {
        id: id.to_string(),
        input: ParamInput::Form {
            key_path: vec![id.to_string()],
            element: FormElement::UserValue {
                value_type: ValueType::String,
                default: json!(""),
                title: id.to_string(),
                description: format!("Description of {}", id),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_bindings_classify() {
        let tree = json!({});
        let param = Param::from_binding("ds", DATASET_NAME_BINDING, &tree).unwrap();
        assert_eq!(param.input, ParamInput::DatasetName);

        let param = Param::from_binding("out", OUTPUT_DIRECTORY_BINDING, &tree).unwrap();
        assert_eq!(param.input, ParamInput::OutputDirectory);

        let param = Param::from_binding("genome", "GRCh38", &tree).unwrap();
        assert_eq!(
            param.input,
            ParamInput::Hardcoded {
                value: "GRCh38".to_string()
            }
        );
    }

    #[test]
    fn form_binding_resolves_element_from_tree() {
        let tree = json!({
            "properties": {
                "advanced": {
                    "type": "object",
                    "properties": {
                        "min_quality": {
                            "type": "integer",
                            "default": 20,
                            "title": "Minimum Quality",
                            "description": "Reads below this are dropped"
                        }
                    }
                }
            }
        });

        let param = Param::from_binding(
            "min_quality",
            "$.params.dataset.paramJson.advanced.min_quality",
            &tree,
        )
        .unwrap();

        match &param.input {
            ParamInput::Form { key_path, element } => {
                assert_eq!(key_path, &["advanced".to_string(), "min_quality".to_string()]);
                assert_eq!(
                    element,
                    &FormElement::UserValue {
                        value_type: ValueType::Integer,
                        default: json!(20),
                        title: "Minimum Quality".to_string(),
                        description: "Reads below this are dropped".to_string(),
                    }
                );
            }
            other => panic!("expected form entry, got {:?}", other),
        }
    }

    #[test]
    fn missing_form_node_becomes_plain_string() {
        let param =
            Param::from_binding("extra", "$.params.dataset.paramJson.extra", &json!({})).unwrap();
        match &param.input {
            ParamInput::Form { element, .. } => {
                assert_eq!(element.title(), "extra");
            }
            other => panic!("expected form entry, got {:?}", other),
        }
    }

    #[test]
    fn reference_glob_round_trips() {
        let element = FormElement::Reference {
            directory: "genome_fasta".to_string(),
            save_as: "genome.fasta".to_string(),
            title: "Genome".to_string(),
            description: String::new(),
        };
        let node = element.schema_node();
        assert_eq!(node["file"], "**/genome_fasta/**/genome.fasta");

        let parsed = FormElement::from_schema_node("genome", &node).unwrap();
        assert_eq!(parsed, element);
    }

    #[test]
    fn malformed_reference_glob_is_rejected() {
        let node = json!({
            "type": "string",
            "pathType": "references",
            "file": "genome_fasta/genome.fasta"
        });
        assert!(FormElement::from_schema_node("genome", &node).is_err());
    }

    #[test]
    fn dataset_node_requires_process_or_file() {
        let node = json!({ "type": "string", "pathType": "dataset" });
        assert!(FormElement::from_schema_node("ds", &node).is_err());
    }

    #[test]
    fn dump_places_nested_nodes() {
        let param = Param {
            id: "min_quality".to_string(),
            input: ParamInput::Form {
                key_path: vec!["advanced".to_string(), "min_quality".to_string()],
                element: FormElement::UserValue {
                    value_type: ValueType::Integer,
                    default: json!(0),
                    title: "Minimum Quality".to_string(),
                    description: String::new(),
                },
            },
        };

        let (input, tree) = dump_params(&[param]);
        assert_eq!(
            input["min_quality"],
            "$.params.dataset.paramJson.advanced.min_quality"
        );
        assert_eq!(tree["properties"]["advanced"]["type"], "object");
        assert_eq!(
            tree["properties"]["advanced"]["properties"]["min_quality"]["type"],
            "integer"
        );
    }

    #[test]
    fn first_param_claiming_a_path_wins() {
        let mk = |id: &str, title: &str| Param {
            id: id.to_string(),
            input: ParamInput::Form {
                key_path: vec!["shared".to_string()],
                element: FormElement::UserValue {
                    value_type: ValueType::String,
                    default: json!(""),
                    title: title.to_string(),
                    description: String::new(),
                },
            },
        };

        let (_, tree) = dump_params(&[mk("a", "first"), mk("b", "second")]);
        assert_eq!(tree["properties"]["shared"]["title"], "first");
    }

    #[test]
    fn load_and_dump_round_trip() {
        let params = vec![
            Param {
                id: "dataset_name".to_string(),
                input: ParamInput::DatasetName,
            },
            Param {
                id: "genome".to_string(),
                input: ParamInput::Form {
                    key_path: vec!["genome".to_string()],
                    element: FormElement::Reference {
                        directory: "genome_fasta".to_string(),
                        save_as: "genome.fasta".to_string(),
                        title: "Genome".to_string(),
                        description: "Reference genome".to_string(),
                    },
                },
            },
        ];

        let (input, tree) = dump_params(&params);
        let doc = json!({ "input": input, "form": { "form": tree, "ui": {} } });
        let loaded = load_params(&doc).unwrap();

        // Input manifests iterate sorted by key
        assert_eq!(loaded.len(), 2);
        assert!(loaded.contains(&params[0]));
        assert!(loaded.contains(&params[1]));
    }

    #[test]
    fn next_param_id_skips_taken_names() {
        let params = vec![
            new_form_param("param_1"),
            new_form_param("param_3"),
        ];
        assert_eq!(next_param_id(&params), "param_2");
        assert_eq!(next_param_id(&[]), "param_1");
    }
}
