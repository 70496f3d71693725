//! Interactive prompts with CI/non-interactive fallback
//!
//! Every prompt takes the current value and returns it unchanged when the
//! terminal is non-interactive or --yes was passed, so scripted runs keep
//! whatever the session already holds.

use super::context::UiContext;
use crate::error::{ForgeError, ForgeResult};
use crate::workflow::{FieldKind, FieldSpec, FieldValue};

fn prompt_failed(e: impl std::fmt::Display) -> ForgeError {
    ForgeError::User(format!("Prompt failed: {}", e))
}

/// Prompt for confirmation, returns the initial value if non-interactive
pub async fn confirm(ctx: &UiContext, message: &str, initial: bool) -> ForgeResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(initial);
    }

    let message = message.to_string();
    tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message).initial_value(initial).interact()
    })
    .await
    .map_err(prompt_failed)?
    .map_err(prompt_failed)
}

/// Prompt for a line of text, returns the initial value if non-interactive
pub async fn input(ctx: &UiContext, message: &str, initial: &str, help: &str) -> ForgeResult<String> {
    if !ctx.is_interactive() || ctx.auto_yes() {
        return Ok(initial.to_string());
    }

    let message = if help.is_empty() {
        message.to_string()
    } else {
        format!("{} ({})", message, help)
    };
    let initial = initial.to_string();

    tokio::task::spawn_blocking(move || {
        let mut prompt = cliclack::input(&message).required(false);
        if !initial.is_empty() {
            prompt = prompt.default_input(&initial);
        }
        prompt.interact::<String>()
    })
    .await
    .map_err(prompt_failed)?
    .map_err(prompt_failed)
}

/// Prompt for selection from a list of options
///
/// Returns the initial value if non-interactive; falls back to the first
/// option when the initial value is not among the options.
pub async fn select<T>(
    ctx: &UiContext,
    message: &str,
    options: Vec<(T, String, String)>,
    initial: T,
) -> ForgeResult<T>
where
    T: Clone + Send + Eq + 'static,
{
    if options.is_empty() {
        return Err(ForgeError::Internal("select with no options".to_string()));
    }

    if !ctx.is_interactive() || ctx.auto_yes() {
        let known = options.iter().any(|(v, _, _)| *v == initial);
        return Ok(if known {
            initial
        } else {
            options[0].0.clone()
        });
    }

    let message = message.to_string();
    tokio::task::spawn_blocking(move || {
        let mut prompt = cliclack::select(&message);
        for (value, label, hint) in options {
            prompt = prompt.item(value, label, hint);
        }
        prompt.interact()
    })
    .await
    .map_err(prompt_failed)?
    .map_err(prompt_failed)
}

/// Prompt for any subset of a list of options
pub async fn multi_select(
    ctx: &UiContext,
    message: &str,
    options: Vec<String>,
    initial: Vec<String>,
) -> ForgeResult<Vec<String>> {
    if options.is_empty() {
        return Ok(vec![]);
    }

    if !ctx.is_interactive() || ctx.auto_yes() {
        return Ok(initial);
    }

    let message = message.to_string();
    tokio::task::spawn_blocking(move || {
        let mut prompt = cliclack::multiselect(&message).required(false);
        for option in options {
            prompt = prompt.item(option.clone(), option, "");
        }
        prompt.initial_values(initial).interact()
    })
    .await
    .map_err(prompt_failed)?
    .map_err(prompt_failed)
}

/// Render one declarative field and return the entered value
///
/// Pages loop over their field list and hand each spec here; the spec's kind
/// picks the widget and its current value seeds the prompt.
pub async fn field(ctx: &UiContext, spec: &FieldSpec) -> ForgeResult<FieldValue> {
    match &spec.kind {
        FieldKind::Text => {
            let text = input(
                ctx,
                &spec.title,
                spec.value.as_text().unwrap_or_default(),
                &spec.help,
            )
            .await?;
            Ok(FieldValue::Text(text))
        }
        FieldKind::Select { options } => {
            let current = spec.value.as_text().unwrap_or_default().to_string();
            let items: Vec<(String, String, String)> = options
                .iter()
                .map(|o| (o.clone(), o.clone(), String::new()))
                .collect();
            let chosen = select(ctx, &spec.title, items, current).await?;
            Ok(FieldValue::Text(chosen))
        }
        FieldKind::MultiSelect { options } => {
            let current = spec.value.as_list().unwrap_or_default().to_vec();
            let chosen = multi_select(ctx, &spec.title, options.clone(), current).await?;
            Ok(FieldValue::List(chosen))
        }
        FieldKind::Toggle => {
            let current = spec.value.as_toggle().unwrap_or(false);
            Ok(FieldValue::Toggle(confirm(ctx, &spec.title, current).await?))
        }
        FieldKind::Integer => {
            let text = input(ctx, &spec.title, &spec.value.to_string(), &spec.help).await?;
            Ok(FieldValue::Integer(text.trim().parse().unwrap_or(0)))
        }
        FieldKind::Number => {
            let text = input(ctx, &spec.title, &spec.value.to_string(), &spec.help).await?;
            Ok(FieldValue::Number(text.trim().parse().unwrap_or(0.0)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn confirm_auto_yes() {
        let ctx = UiContext::non_interactive().with_auto_yes(true);
        assert!(confirm(&ctx, "Test?", false).await.unwrap());
    }

    #[tokio::test]
    async fn confirm_non_interactive_keeps_initial() {
        let ctx = UiContext::non_interactive();
        assert!(confirm(&ctx, "Test?", true).await.unwrap());
        assert!(!confirm(&ctx, "Test?", false).await.unwrap());
    }

    #[tokio::test]
    async fn input_non_interactive_keeps_initial() {
        let ctx = UiContext::non_interactive();
        let value = input(&ctx, "Name", "current", "").await.unwrap();
        assert_eq!(value, "current");
    }

    #[tokio::test]
    async fn select_non_interactive_keeps_known_initial() {
        let ctx = UiContext::non_interactive();
        let options = vec![
            ("a".to_string(), "Option A".to_string(), String::new()),
            ("b".to_string(), "Option B".to_string(), String::new()),
        ];

        let kept = select(&ctx, "Choose:", options.clone(), "b".to_string())
            .await
            .unwrap();
        assert_eq!(kept, "b");

        let fallback = select(&ctx, "Choose:", options, "z".to_string())
            .await
            .unwrap();
        assert_eq!(fallback, "a");
    }

    #[tokio::test]
    async fn field_renders_non_interactive_defaults() {
        let ctx = UiContext::non_interactive();

        let spec = FieldSpec::text("id", "Workflow ID", "", "my-workflow");
        let value = field(&ctx, &spec).await.unwrap();
        assert_eq!(value, FieldValue::Text("my-workflow".to_string()));

        let spec = FieldSpec::toggle("multiple", "Allow multiple?", "", true);
        let value = field(&ctx, &spec).await.unwrap();
        assert_eq!(value, FieldValue::Toggle(true));
    }
}
