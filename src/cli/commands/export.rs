//! Export command - write the configuration artifacts to disk

use crate::bundle::{archive, validate, ConfigBundle};
use crate::cli::args::ExportArgs;
use crate::config::AppConfig;
use crate::error::{ForgeError, ForgeResult};
use crate::session::SessionManager;
use crate::ui::{self, UiContext};
use std::path::PathBuf;
use tokio::fs;

/// Execute the export command
///
/// Validation errors block the export entirely; warnings are shown and the
/// files are written anyway.
pub async fn execute(
    args: ExportArgs,
    session_name: &str,
    config: &AppConfig,
    ctx: &UiContext,
) -> ForgeResult<()> {
    let manager = SessionManager::new().await?;
    let session = manager.open_or_create(session_name).await?;

    let strictness = args.strictness.unwrap_or(config.validation.strictness);
    let report = validate::validate(&session.form, strictness);

    for issue in report.errors() {
        ui::step_error(ctx, &issue.to_string());
    }
    for issue in report.warnings() {
        ui::step_warn(ctx, &issue.to_string());
    }
    if report.has_errors() {
        return Err(ForgeError::ValidationFailed(report.errors().count()));
    }

    let bundle = ConfigBundle::from_state(&session.form)?;

    let out_dir = args
        .out
        .or_else(|| config.export.out_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&out_dir)
        .await
        .map_err(|e| ForgeError::io(format!("creating {}", out_dir.display()), e))?;

    if args.archive {
        let bytes = archive::write_archive(&bundle)?;
        let path = out_dir.join(&config.export.archive_name);
        fs::write(&path, bytes)
            .await
            .map_err(|e| ForgeError::io(format!("writing {}", path.display()), e))?;
        ui::step_ok_detail(ctx, "Wrote archive", &path.display().to_string());
    } else {
        for artifact in bundle.artifacts() {
            let path = out_dir.join(artifact.file_name);
            fs::write(&path, &artifact.contents)
                .await
                .map_err(|e| ForgeError::io(format!("writing {}", path.display()), e))?;
            ui::step_ok(ctx, &format!("Wrote {}", artifact.file_name));
        }
        ui::step_ok_detail(
            ctx,
            &format!("Exported {} file(s)", bundle.artifacts().len()),
            &out_dir.display().to_string(),
        );
    }

    Ok(())
}
