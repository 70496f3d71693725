//! Scan command - populate outputs from example files

use crate::catalog::TermDictionary;
use crate::cli::args::ScanArgs;
use crate::config::AppConfig;
use crate::error::ForgeResult;
use crate::scan::{scan_dir, ScanOptions};
use crate::session::SessionManager;
use crate::ui::{self, UiContext};

/// Execute the scan command
///
/// Replaces the session's output list with one spec per readable delimited
/// file found under the directory.
pub async fn execute(
    args: ScanArgs,
    session_name: &str,
    config: &AppConfig,
    ctx: &UiContext,
) -> ForgeResult<()> {
    let terms = TermDictionary::load(config.catalog.terms.as_deref()).await?;
    let options = ScanOptions {
        extensions: args.ext,
    };

    let outcome = scan_dir(&args.dir, &options, &terms).await?;

    for file_name in &outcome.skipped {
        ui::step_warn(ctx, &format!("Could not parse {} as a table", file_name));
    }

    if outcome.outputs.is_empty() {
        ui::step_warn(ctx, "No files found to parse");
        return Ok(());
    }

    let manager = SessionManager::new().await?;
    let mut session = manager.open_or_create(session_name).await?;
    session.history.set_limit(config.session.history_depth);
    session.snapshot();
    session.form.outputs = outcome.outputs;
    session.save().await?;

    ui::step_ok_detail(
        ctx,
        &format!("Populated {} output file(s)", session.form.outputs.len()),
        &args.dir.display().to_string(),
    );

    Ok(())
}
