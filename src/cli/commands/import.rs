//! Import command - load exported artifacts back into the session

use crate::bundle::import::import_files;
use crate::cli::args::ImportArgs;
use crate::config::AppConfig;
use crate::error::ForgeResult;
use crate::session::SessionManager;
use crate::ui::{self, UiContext};

/// Execute the import command
pub async fn execute(
    args: ImportArgs,
    session_name: &str,
    config: &AppConfig,
    ctx: &UiContext,
) -> ForgeResult<()> {
    let manager = SessionManager::new().await?;
    let mut session = manager.open_or_create(session_name).await?;
    session.history.set_limit(config.session.history_depth);

    session.snapshot();
    let applied = import_files(&mut session.form, &args.files).await?;
    session.save().await?;

    for file_name in &applied {
        ui::step_ok(ctx, &format!("Loaded {}", file_name));
    }
    ui::step_ok_detail(
        ctx,
        &format!("Imported {} file(s)", applied.len()),
        &format!("session '{}'", session.name),
    );

    Ok(())
}
