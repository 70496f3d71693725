//! Edit command - interactive wizard over the form pages
//!
//! Pages mirror the tabs of the configuration form: workflow identity, input
//! parameters, output files, and the passthrough scripts. Every page visit
//! that changes the document records an undo snapshot and saves the session.

use crate::bundle::{validate, ConfigBundle};
use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::error::{ForgeError, ForgeResult};
use crate::session::{Session, SessionCache, SessionManager};
use crate::ui::{self, UiContext};
use crate::workflow::params::{self, FormElement, ParamInput, ValueType};
use crate::workflow::{ColumnSpec, Delimiter, FieldSpec, FormState, OutputSpec};
use serde_json::{json, Value};
use tokio::fs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Workflow,
    Params,
    Outputs,
    Scripts,
    Preview,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemAction {
    Edit,
    Remove,
    Back,
}

/// Execute the edit command
pub async fn execute(session_name: &str, config: &AppConfig, ctx: &UiContext) -> ForgeResult<()> {
    if !ctx.is_interactive() {
        return Err(ForgeError::User(
            "The edit wizard needs an interactive terminal".to_string(),
        ));
    }

    let manager = SessionManager::new().await?;
    let mut session = manager.open_or_create(session_name).await?;
    session.history.set_limit(config.session.history_depth);
    let catalog = Catalog::from_config(config);

    ui::intro(ctx, "flowforge - workflow configuration");

    loop {
        let page = ui::select(
            ctx,
            "Edit which page?",
            vec![
                page_item(Page::Workflow, "Analysis workflow", "identity, repository, executor"),
                page_item(Page::Params, "Input parameters", "values provided at launch"),
                page_item(Page::Outputs, "Output files", "tables ingested from the results"),
                page_item(Page::Scripts, "Scripts", "preprocess and compute passthrough"),
                page_item(Page::Preview, "Preview", "validation report and artifact sizes"),
                page_item(Page::Done, "Done", "save and exit"),
            ],
            Page::Done,
        )
        .await?;

        let before = session.form.to_doc();
        match page {
            Page::Workflow => {
                edit_source(ctx, &catalog, &mut session.cache, &mut session.form).await?
            }
            Page::Params => {
                edit_params(ctx, &catalog, &mut session.cache, &mut session.form).await?
            }
            Page::Outputs => edit_outputs(ctx, &mut session.form).await?,
            Page::Scripts => edit_scripts(ctx, &mut session.form).await?,
            Page::Preview => preview(ctx, config, &session)?,
            Page::Done => break,
        }

        if session.form.to_doc() != before {
            session.history.record(before);
            session.save().await?;
        }
    }

    session.save().await?;
    ui::outro_success(ctx, &format!("Session '{}' saved", session.name));
    Ok(())
}

fn page_item(page: Page, label: &str, hint: &str) -> (Page, String, String) {
    (page, label.to_string(), hint.to_string())
}

/// Workflow identity page, rendered from its declarative field list
async fn edit_source(
    ctx: &UiContext,
    catalog: &Catalog,
    cache: &mut SessionCache,
    form: &mut FormState,
) -> ForgeResult<()> {
    let all_labels = catalog.process_labels(cache, true).await?;
    let workflow_labels = catalog.process_labels(cache, false).await?;

    for spec in form.source.field_specs(&all_labels, &workflow_labels) {
        let value = ui::field(ctx, &spec).await?;
        form.source.apply(spec.key, &value);
    }

    if !form.source.id_is_valid() {
        ui::step_warn(ctx, "Workflow ID must be all lowercase alphanumeric with dashes");
    }
    if catalog.process_ids(cache).await?.contains(&form.source.id) {
        ui::step_warn(
            ctx,
            "Workflow ID is already used by a process in the pipeline catalog",
        );
    }

    Ok(())
}

/// Input parameters page
async fn edit_params(
    ctx: &UiContext,
    catalog: &Catalog,
    cache: &mut SessionCache,
    form: &mut FormState,
) -> ForgeResult<()> {
    const ADD: i64 = -1;
    const BACK: i64 = -2;

    loop {
        let mut items: Vec<(i64, String, String)> = form
            .params
            .iter()
            .enumerate()
            .map(|(ix, p)| (ix as i64, p.id.clone(), p.input.kind_label().to_string()))
            .collect();
        items.push((ADD, "Add parameter".to_string(), String::new()));
        items.push((BACK, "Back".to_string(), String::new()));

        match ui::select(ctx, "Input parameters", items, BACK).await? {
            BACK => return Ok(()),
            ADD => {
                let id = params::next_param_id(&form.params);
                form.params.push(params::new_form_param(&id));
                let ix = form.params.len() - 1;
                edit_param(ctx, catalog, cache, form, ix).await?;
            }
            ix => {
                let ix = ix as usize;
                match item_action(ctx, &form.params[ix].id.clone()).await? {
                    ItemAction::Edit => edit_param(ctx, catalog, cache, form, ix).await?,
                    ItemAction::Remove => {
                        form.params.remove(ix);
                    }
                    ItemAction::Back => {}
                }
            }
        }
    }
}

async fn item_action(ctx: &UiContext, name: &str) -> ForgeResult<ItemAction> {
    ui::select(
        ctx,
        &format!("'{}'", name),
        vec![
            (ItemAction::Edit, "Edit".to_string(), String::new()),
            (ItemAction::Remove, "Remove".to_string(), String::new()),
            (ItemAction::Back, "Back".to_string(), String::new()),
        ],
        ItemAction::Back,
    )
    .await
}

async fn edit_param(
    ctx: &UiContext,
    catalog: &Catalog,
    cache: &mut SessionCache,
    form: &mut FormState,
    ix: usize,
) -> ForgeResult<()> {
    let mut param = form.params[ix].clone();

    let id = ui::input(
        ctx,
        "Parameter ID",
        &param.id,
        "A unique key (with no spaces) used to identify the parameter",
    )
    .await?;
    if id != param.id {
        // A renamed root-level form entry moves with its parameter
        if let ParamInput::Form { key_path, .. } = &mut param.input {
            if key_path.len() == 1 && key_path[0] == param.id {
                key_path[0] = id.clone();
            }
        }
        param.id = id;
    }

    let kinds = [
        ParamInput::Form {
            key_path: vec![],
            element: FormElement::UserValue {
                value_type: ValueType::String,
                default: json!(""),
                title: String::new(),
                description: String::new(),
            },
        },
        ParamInput::DatasetName,
        ParamInput::Hardcoded {
            value: String::new(),
        },
        ParamInput::InputDirectory,
        ParamInput::OutputDirectory,
    ];
    let items: Vec<(String, String, String)> = kinds
        .iter()
        .map(|k| {
            (
                k.kind_label().to_string(),
                k.kind_label().to_string(),
                k.kind_description().to_string(),
            )
        })
        .collect();

    let chosen = ui::select(
        ctx,
        "Parameter Type",
        items,
        param.input.kind_label().to_string(),
    )
    .await?;

    param.input = match chosen.as_str() {
        "Dataset Name" => ParamInput::DatasetName,
        "Input Directory" => ParamInput::InputDirectory,
        "Output Directory" => ParamInput::OutputDirectory,
        "Hardcoded Value" => {
            let current = match &param.input {
                ParamInput::Hardcoded { value } => value.clone(),
                _ => String::new(),
            };
            let value = ui::input(ctx, "Value", &current, "").await?;
            ParamInput::Hardcoded { value }
        }
        _ => {
            let (key_path, element) = match param.input {
                ParamInput::Form { key_path, element } => (key_path, element),
                _ => {
                    // Turning another kind into a form entry starts a blank
                    // element rooted at the parameter's own id
                    match params::new_form_param(&param.id).input {
                        ParamInput::Form { key_path, element } => (key_path, element),
                        _ => unreachable!("new_form_param always builds a form entry"),
                    }
                }
            };
            let element = edit_form_entry(ctx, catalog, cache, element).await?;
            ParamInput::Form { key_path, element }
        }
    };

    form.params[ix] = param;
    Ok(())
}

async fn edit_form_entry(
    ctx: &UiContext,
    catalog: &Catalog,
    cache: &mut SessionCache,
    element: FormElement,
) -> ForgeResult<FormElement> {
    let title = ui::input(
        ctx,
        "Parameter Title",
        element.title(),
        "Title displayed in the form to the user",
    )
    .await?;
    let description = ui::input(
        ctx,
        "Parameter Description",
        element.description(),
        "Longer description provided in the form to the user",
    )
    .await?;
    let element = element.with_naming(title.clone(), description.clone());

    let form_types = [
        "User-Provided Value",
        "Dataset",
        "Input File",
        "Reference",
    ];
    let items: Vec<(String, String, String)> = form_types
        .iter()
        .map(|t| (t.to_string(), t.to_string(), String::new()))
        .collect();
    let chosen = ui::select(
        ctx,
        "Form Entry Type",
        items,
        element.kind_label().to_string(),
    )
    .await?;

    match chosen.as_str() {
        "Dataset" => {
            let process = match &element {
                FormElement::Dataset { process, .. } => process.clone(),
                _ => "paired_dnaseq".to_string(),
            };
            let labels = catalog.process_labels(cache, true).await?;
            let initial = catalog
                .label_for_process(cache, &process)
                .await?
                .unwrap_or_else(|| labels.first().cloned().unwrap_or_default());
            let items: Vec<(String, String, String)> = labels
                .iter()
                .map(|l| (l.clone(), l.clone(), String::new()))
                .collect();
            let label = ui::select(ctx, "Select Dataset of Type", items, initial).await?;

            Ok(FormElement::Dataset {
                process: Catalog::process_id(&label),
                title,
                description,
            })
        }
        "Input File" => {
            let (file, multiple) = match &element {
                FormElement::InputFile { file, multiple, .. } => (file.clone(), *multiple),
                _ => ("**/*".to_string(), false),
            };
            let file = ui::input(
                ctx,
                "Filter Available Files with Pattern",
                &file,
                "Only files matching the wildcard glob can be selected",
            )
            .await?;
            let multiple = ui::confirm(ctx, "Allow Multiple File Selection", multiple).await?;

            Ok(FormElement::InputFile {
                file,
                multiple,
                title,
                description,
            })
        }
        "Reference" => {
            let current_directory = match &element {
                FormElement::Reference { directory, .. } => directory.clone(),
                _ => "genome_fasta".to_string(),
            };
            let names = catalog.reference_names(cache).await?;
            let initial = catalog
                .reference(cache, &current_directory)
                .await
                .map(|r| r.name)
                .unwrap_or_else(|_| names.first().cloned().unwrap_or_default());
            let items: Vec<(String, String, String)> = names
                .iter()
                .map(|n| (n.clone(), n.clone(), String::new()))
                .collect();
            let name = ui::select(ctx, "Reference Type", items, initial).await?;

            let reference = catalog.reference(cache, &name).await?;
            let files = catalog.reference_files(cache, &name).await?;
            let save_as = match files.len() {
                0 => "*".to_string(),
                1 => files[0].clone(),
                _ => {
                    let items: Vec<(String, String, String)> = files
                        .iter()
                        .map(|f| (f.clone(), f.clone(), String::new()))
                        .collect();
                    ui::select(ctx, "Reference File", items, files[0].clone()).await?
                }
            };

            Ok(FormElement::Reference {
                directory: reference.directory,
                save_as,
                title,
                description,
            })
        }
        _ => {
            let (current_type, current_default) = match &element {
                FormElement::UserValue {
                    value_type,
                    default,
                    ..
                } => (*value_type, default.clone()),
                _ => (ValueType::String, json!("")),
            };

            let items: Vec<(String, String, String)> = ValueType::all()
                .iter()
                .map(|t| (t.label().to_string(), t.label().to_string(), String::new()))
                .collect();
            let chosen = ui::select(
                ctx,
                "Form Value Type",
                items,
                current_type.label().to_string(),
            )
            .await?;
            let value_type = ValueType::from_label(&chosen);

            // Changing the type resets the default to that type's zero value
            let current_default = if value_type == current_type {
                current_default
            } else {
                value_type.zero()
            };
            let default = prompt_default(ctx, value_type, current_default).await?;

            Ok(FormElement::UserValue {
                value_type,
                default,
                title,
                description,
            })
        }
    }
}

async fn prompt_default(
    ctx: &UiContext,
    value_type: ValueType,
    current: Value,
) -> ForgeResult<Value> {
    match value_type {
        ValueType::Boolean => {
            let initial = current.as_bool().unwrap_or(false);
            Ok(json!(ui::confirm(ctx, "Default Value", initial).await?))
        }
        ValueType::Integer => {
            let initial = current.as_i64().unwrap_or(0).to_string();
            let text = ui::input(ctx, "Default Value", &initial, "").await?;
            Ok(json!(text.trim().parse::<i64>().unwrap_or(0)))
        }
        ValueType::Number => {
            let initial = current.as_f64().unwrap_or(0.0).to_string();
            let text = ui::input(ctx, "Default Value", &initial, "").await?;
            Ok(json!(text.trim().parse::<f64>().unwrap_or(0.0)))
        }
        ValueType::Array => {
            let initial = current
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(",")
                })
                .unwrap_or_default();
            let text = ui::input(
                ctx,
                "Default Values (comma-separated)",
                &initial,
                "",
            )
            .await?;
            let items: Vec<String> = text
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            Ok(json!(items))
        }
        ValueType::String => {
            let initial = current.as_str().unwrap_or_default();
            Ok(json!(ui::input(ctx, "Default Value", initial, "").await?))
        }
    }
}

/// Output files page
async fn edit_outputs(ctx: &UiContext, form: &mut FormState) -> ForgeResult<()> {
    const ADD: i64 = -1;
    const BACK: i64 = -2;

    loop {
        let mut items: Vec<(i64, String, String)> = form
            .outputs
            .iter()
            .enumerate()
            .map(|(ix, o)| (ix as i64, o.name.clone(), o.source.clone()))
            .collect();
        items.push((ADD, "Add output file".to_string(), String::new()));
        items.push((BACK, "Back".to_string(), String::new()));

        match ui::select(ctx, "Output files", items, BACK).await? {
            BACK => return Ok(()),
            ADD => {
                form.outputs.push(OutputSpec {
                    name: format!("Output File {}", form.outputs.len() + 1),
                    ..OutputSpec::default()
                });
                let ix = form.outputs.len() - 1;
                edit_output(ctx, &mut form.outputs[ix]).await?;
            }
            ix => {
                let ix = ix as usize;
                match item_action(ctx, &form.outputs[ix].name.clone()).await? {
                    ItemAction::Edit => edit_output(ctx, &mut form.outputs[ix]).await?,
                    ItemAction::Remove => {
                        form.outputs.remove(ix);
                    }
                    ItemAction::Back => {}
                }
            }
        }
    }
}

async fn edit_output(ctx: &UiContext, output: &mut OutputSpec) -> ForgeResult<()> {
    let specs = vec![
        FieldSpec::text(
            "name",
            "Display Name",
            "Name of the file presented to the user",
            &output.name,
        ),
        FieldSpec::text(
            "desc",
            "Description",
            "Full description of the file presented to the user",
            &output.desc,
        ),
        FieldSpec::text(
            "source",
            "File Path",
            "File location within the output directory; wrap varying segments in [Token]",
            &output.source,
        ),
        FieldSpec::text(
            "url",
            "Documentation URL (optional)",
            "Webpage documenting the file contents",
            &output.url,
        ),
    ];

    for spec in specs {
        let value = ui::field(ctx, &spec).await?;
        let text = value.as_text().unwrap_or_default().to_string();
        match spec.key {
            "name" => output.name = text,
            "desc" => output.desc = text,
            "source" => output.source = text.trim_matches('/').to_string(),
            "url" => output.url = text,
            _ => {}
        }
    }

    let delimiter = ui::select(
        ctx,
        "Delimiter",
        vec![
            (
                Delimiter::Comma,
                "Comma".to_string(),
                "values separated by commas".to_string(),
            ),
            (
                Delimiter::Tab,
                "Tab".to_string(),
                "values separated by tabs".to_string(),
            ),
        ],
        output.delimiter,
    )
    .await?;
    output.delimiter = delimiter;

    output.sync_concat();
    for concat in &mut output.concat {
        concat.name = ui::input(
            ctx,
            &format!("Token Name [{}]", concat.token),
            &concat.name,
            "Display name for the information encoded in the token",
        )
        .await?;
        concat.desc = ui::input(
            ctx,
            &format!("Token Description [{}]", concat.token),
            &concat.desc,
            "Longer description of the information encoded in the token",
        )
        .await?;
    }

    edit_columns(ctx, output).await?;
    edit_melt(ctx, output).await?;

    if output.columns.is_empty() {
        ui::step_warn(ctx, "Please define the file columns");
    }

    Ok(())
}

async fn edit_columns(ctx: &UiContext, output: &mut OutputSpec) -> ForgeResult<()> {
    const ADD: i64 = -1;
    const BACK: i64 = -2;

    loop {
        let mut items: Vec<(i64, String, String)> = output
            .columns
            .iter()
            .enumerate()
            .map(|(ix, c)| (ix as i64, c.col.clone(), c.name.clone()))
            .collect();
        items.push((ADD, "Add column".to_string(), String::new()));
        items.push((BACK, "Back".to_string(), String::new()));

        match ui::select(ctx, "Columns", items, BACK).await? {
            BACK => return Ok(()),
            ADD => {
                output.columns.push(ColumnSpec {
                    col: "New Column".to_string(),
                    name: "New Column".to_string(),
                    desc: String::new(),
                });
                let ix = output.columns.len() - 1;
                edit_column(ctx, &mut output.columns[ix]).await?;
            }
            ix => {
                let ix = ix as usize;
                match item_action(ctx, &output.columns[ix].col.clone()).await? {
                    ItemAction::Edit => edit_column(ctx, &mut output.columns[ix]).await?,
                    ItemAction::Remove => {
                        output.columns.remove(ix);
                    }
                    ItemAction::Back => {}
                }
            }
        }
    }
}

async fn edit_column(ctx: &UiContext, column: &mut ColumnSpec) -> ForgeResult<()> {
    column.col = ui::input(
        ctx,
        "Column Header",
        &column.col,
        "Value in the header row for the column",
    )
    .await?;
    column.name = ui::input(
        ctx,
        "Column Name",
        &column.name,
        "Name presented to the user for the values in the column",
    )
    .await?;
    column.desc = ui::input(
        ctx,
        "Column Description",
        &column.desc,
        "Longer description of the data in the column",
    )
    .await?;
    Ok(())
}

async fn edit_melt(ctx: &UiContext, output: &mut OutputSpec) -> ForgeResult<()> {
    let enabled = ui::confirm(ctx, "Melt Remaining Columns", output.melt.is_some()).await?;
    if !enabled {
        output.melt = None;
        return Ok(());
    }

    let mut melt = output.melt.clone().unwrap_or_default();

    melt.key.name = ui::input(
        ctx,
        "Name of data in column headers",
        &melt.key.name,
        "",
    )
    .await?;
    melt.key.desc = ui::input(
        ctx,
        "Description of data in column headers",
        &melt.key.desc,
        "",
    )
    .await?;
    melt.value.name = ui::input(ctx, "Name of data in table values", &melt.value.name, "").await?;
    melt.value.desc = ui::input(
        ctx,
        "Description of data in table values",
        &melt.value.desc,
        "",
    )
    .await?;

    output.melt = Some(melt);
    Ok(())
}

/// Scripts page: preprocess and compute passthrough
async fn edit_scripts(ctx: &UiContext, form: &mut FormState) -> ForgeResult<()> {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Action {
        LoadPreprocess,
        LoadCompute,
        ResetPreprocess,
        ClearCompute,
        Back,
    }

    loop {
        let preprocess_hint = format!("{} bytes", form.preprocess.len());
        let compute_hint = format!("{} bytes", form.compute.len());

        let action = ui::select(
            ctx,
            "Scripts",
            vec![
                (
                    Action::LoadPreprocess,
                    "Load preprocess.py from a file".to_string(),
                    preprocess_hint,
                ),
                (
                    Action::LoadCompute,
                    "Load process-compute.config from a file".to_string(),
                    compute_hint,
                ),
                (
                    Action::ResetPreprocess,
                    "Reset preprocess.py to the template".to_string(),
                    String::new(),
                ),
                (
                    Action::ClearCompute,
                    "Clear the compute configuration".to_string(),
                    String::new(),
                ),
                (Action::Back, "Back".to_string(), String::new()),
            ],
            Action::Back,
        )
        .await?;

        match action {
            Action::LoadPreprocess => {
                if let Some(contents) = load_script(ctx, "Path to the preprocessing script").await? {
                    form.preprocess = contents;
                    ui::step_ok(ctx, "Loaded preprocessing script");
                }
            }
            Action::LoadCompute => {
                if let Some(contents) = load_script(ctx, "Path to the compute configuration").await?
                {
                    form.compute = contents;
                    ui::step_ok(ctx, "Loaded compute configuration");
                }
            }
            Action::ResetPreprocess => {
                form.preprocess = crate::workflow::DEFAULT_PREPROCESS.to_string();
                ui::step_ok(ctx, "Reset preprocessing script");
            }
            Action::ClearCompute => {
                form.compute = String::new();
                ui::step_ok(ctx, "Cleared compute configuration");
            }
            Action::Back => return Ok(()),
        }
    }
}

async fn load_script(ctx: &UiContext, message: &str) -> ForgeResult<Option<String>> {
    let path = ui::input(ctx, message, "", "").await?;
    if path.is_empty() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&path)
        .await
        .map_err(|e| ForgeError::io(format!("reading {}", path), e))?;
    Ok(Some(contents))
}

/// Preview page: validation report and artifact sizes
fn preview(ctx: &UiContext, config: &AppConfig, session: &Session) -> ForgeResult<()> {
    let report = validate::validate(&session.form, config.validation.strictness);

    ui::section(ctx, "Validation");
    if report.is_empty() {
        ui::step_ok(ctx, "No validation issues");
    }
    for issue in report.errors() {
        ui::step_error(ctx, &issue.to_string());
    }
    for issue in report.warnings() {
        ui::step_warn(ctx, &issue.to_string());
    }

    ui::section(ctx, "Artifacts");
    let bundle = ConfigBundle::from_state(&session.form)?;
    for artifact in bundle.artifacts() {
        ui::key_value(
            ctx,
            artifact.file_name,
            &format!("{} bytes", artifact.contents.len()),
        );
    }

    Ok(())
}
