//! Validate command - report every issue in the configuration

use crate::catalog::Catalog;
use crate::cli::args::ValidateArgs;
use crate::config::AppConfig;
use crate::error::{ForgeError, ForgeResult};
use crate::session::SessionManager;
use crate::ui::{self, UiContext};

/// Execute the validate command
pub async fn execute(
    args: ValidateArgs,
    session_name: &str,
    config: &AppConfig,
    ctx: &UiContext,
) -> ForgeResult<()> {
    let manager = SessionManager::new().await?;
    let mut session = manager.open_or_create(session_name).await?;

    let strictness = args.strictness.unwrap_or(config.validation.strictness);
    let report = crate::bundle::validate::validate(&session.form, strictness);

    // Catalog failures downgrade the ID collision check to a warning; the
    // local checks above still decide the exit code
    let catalog = Catalog::from_config(config);
    match catalog.process_ids(&mut session.cache).await {
        Ok(ids) => {
            if ids.contains(&session.form.source.id) {
                ui::step_warn(
                    ctx,
                    "Workflow ID is already used by a process in the pipeline catalog",
                );
            }
        }
        Err(e) => ui::step_warn_hint(
            ctx,
            &format!("Catalog check skipped: {}", e),
            "Run: flowforge session refresh",
        ),
    }
    session.save().await?;

    for issue in report.errors() {
        ui::step_error(ctx, &issue.to_string());
    }
    for issue in report.warnings() {
        ui::step_warn(ctx, &issue.to_string());
    }

    if report.has_errors() {
        return Err(ForgeError::ValidationFailed(report.errors().count()));
    }

    ui::step_ok(ctx, "Configuration is valid");
    Ok(())
}
