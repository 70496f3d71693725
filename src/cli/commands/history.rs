//! Undo/redo commands - step the configuration history

use crate::error::{ForgeError, ForgeResult};
use crate::session::SessionManager;
use crate::ui::{self, UiContext};
use crate::workflow::FormState;

/// Step the session's configuration back one change
pub async fn undo(session_name: &str, ctx: &UiContext) -> ForgeResult<()> {
    let manager = SessionManager::new().await?;
    let mut session = manager
        .get(session_name)
        .await?
        .ok_or_else(|| ForgeError::SessionNotFound(session_name.to_string()))?;

    let current = session.form.to_doc();
    let previous = session
        .history
        .undo(current)
        .ok_or(ForgeError::HistoryEmpty("undo"))?;

    session.form = FormState::from_doc(&previous)?;
    session.save().await?;

    ui::step_ok(ctx, "Stepped back one change");
    Ok(())
}

/// Step the session's configuration forward one change
pub async fn redo(session_name: &str, ctx: &UiContext) -> ForgeResult<()> {
    let manager = SessionManager::new().await?;
    let mut session = manager
        .get(session_name)
        .await?
        .ok_or_else(|| ForgeError::SessionNotFound(session_name.to_string()))?;

    let current = session.form.to_doc();
    let next = session
        .history
        .redo(current)
        .ok_or(ForgeError::HistoryEmpty("redo"))?;

    session.form = FormState::from_doc(&next)?;
    session.save().await?;

    ui::step_ok(ctx, "Stepped forward one change");
    Ok(())
}
