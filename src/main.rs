//! flowforge - Pipeline Configuration Builder
//!
//! CLI entry point that dispatches to subcommands.

use clap::{CommandFactory, Parser};
use console::style;
use flowforge::cli::{Cli, Commands};
use flowforge::config::ConfigManager;
use flowforge::error::ForgeResult;
use flowforge::ui::UiContext;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ForgeResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("flowforge=warn"),
        1 => EnvFilter::new("flowforge=info"),
        _ => EnvFilter::new("flowforge=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    // Completions don't need config loading
    if let Commands::Completions(args) = cli.command {
        clap_complete::generate(
            args.shell,
            &mut Cli::command(),
            "flowforge",
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let config = config_manager.load().await?;

    // Ensure state directories exist
    ConfigManager::ensure_state_dirs().await?;

    // Age-based session cleanup, disabled by default
    if config.session.max_age_hours > 0 {
        let manager = flowforge::session::SessionManager::new().await?;
        manager.cleanup(config.session.max_age_hours).await?;
    }

    let ctx = UiContext::detect().with_auto_yes(cli.yes);
    let session = cli.session.as_str();

    // Dispatch to command
    match cli.command {
        Commands::Completions(_) => unreachable!("Completions handled above"),
        Commands::Edit => flowforge::cli::commands::edit(session, &config, &ctx).await,
        Commands::Show(args) => flowforge::cli::commands::show(args, session).await,
        Commands::Validate(args) => {
            flowforge::cli::commands::validate(args, session, &config, &ctx).await
        }
        Commands::Export(args) => {
            flowforge::cli::commands::export(args, session, &config, &ctx).await
        }
        Commands::Import(args) => {
            flowforge::cli::commands::import(args, session, &config, &ctx).await
        }
        Commands::Scan(args) => flowforge::cli::commands::scan(args, session, &config, &ctx).await,
        Commands::Undo => flowforge::cli::commands::undo(session, &ctx).await,
        Commands::Redo => flowforge::cli::commands::redo(session, &ctx).await,
        Commands::Session(args) => flowforge::cli::commands::session(args, session, &ctx).await,
        Commands::Config(args) => flowforge::cli::commands::config(args, &config, &ctx).await,
    }
}
