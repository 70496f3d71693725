//! Session command - list, refresh, and delete sessions

use crate::cli::args::{OutputFormat, SessionAction, SessionArgs};
use crate::error::ForgeResult;
use crate::session::{Session, SessionManager};
use crate::ui::{self, UiContext};

/// Execute the session command
pub async fn execute(args: SessionArgs, session_name: &str, ctx: &UiContext) -> ForgeResult<()> {
    let manager = SessionManager::new().await?;

    match args.action {
        SessionAction::List { format } => list_sessions(&manager, format).await,
        SessionAction::Refresh => {
            let dropped = manager.refresh(session_name).await?;
            ui::step_ok(
                ctx,
                &format!(
                    "Cleared {} cached lookup(s) from session '{}'",
                    dropped, session_name
                ),
            );
            Ok(())
        }
        SessionAction::Delete => {
            let message = format!("Delete session '{}'?", session_name);
            if ui::confirm(ctx, &message, false).await? {
                manager.delete(session_name).await?;
                ui::step_ok(ctx, &format!("Deleted session '{}'", session_name));
            } else {
                ui::step_info(ctx, "Nothing deleted");
            }
            Ok(())
        }
    }
}

async fn list_sessions(manager: &SessionManager, format: OutputFormat) -> ForgeResult<()> {
    let sessions = manager.list().await?;

    if sessions.is_empty() {
        println!("No sessions found.");
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_table(&sessions),
        OutputFormat::Json => print_json(&sessions)?,
        OutputFormat::Plain => print_plain(&sessions),
    }

    Ok(())
}

fn print_table(sessions: &[Session]) {
    println!(
        "{:<20} {:<17} {:<17} {:>7} {:>8} {:>7}",
        "NAME", "CREATED", "UPDATED", "PARAMS", "OUTPUTS", "CACHED"
    );
    println!("{}", "-".repeat(80));

    for session in sessions {
        println!(
            "{:<20} {:<17} {:<17} {:>7} {:>8} {:>7}",
            session.name,
            session.created_at.format("%Y-%m-%d %H:%M"),
            session.updated_at.format("%Y-%m-%d %H:%M"),
            session.form.params.len(),
            session.form.outputs.len(),
            session.cache.len(),
        );
    }

    println!();
    println!("Total: {} session(s)", sessions.len());
}

fn print_json(sessions: &[Session]) -> ForgeResult<()> {
    #[derive(serde::Serialize)]
    struct SessionJson {
        name: String,
        created_at: String,
        updated_at: String,
        params: usize,
        outputs: usize,
        cached: usize,
    }

    let rows: Vec<SessionJson> = sessions
        .iter()
        .map(|s| SessionJson {
            name: s.name.clone(),
            created_at: s.created_at.to_rfc3339(),
            updated_at: s.updated_at.to_rfc3339(),
            params: s.form.params.len(),
            outputs: s.form.outputs.len(),
            cached: s.cache.len(),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn print_plain(sessions: &[Session]) {
    for session in sessions {
        println!("{}", session.name);
    }
}
