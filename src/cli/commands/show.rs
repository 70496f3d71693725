//! Show command - print rendered artifacts

use crate::bundle::ConfigBundle;
use crate::cli::args::ShowArgs;
use crate::error::{ForgeError, ForgeResult};
use crate::session::SessionManager;
use console::style;

/// Execute the show command
pub async fn execute(args: ShowArgs, session_name: &str) -> ForgeResult<()> {
    let manager = SessionManager::new().await?;
    let session = manager.open_or_create(session_name).await?;
    let bundle = ConfigBundle::from_state(&session.form)?;

    match args.artifact {
        Some(name) => {
            let artifact = bundle
                .get(&name)
                .ok_or_else(|| ForgeError::ArtifactUnknown(name.clone()))?;
            println!("{}", artifact.contents);
        }
        None => {
            for artifact in bundle.artifacts() {
                println!("{}", style(format!("--- {} ---", artifact.file_name)).bold());
                println!("{}", artifact.contents);
                println!();
            }
        }
    }

    Ok(())
}
