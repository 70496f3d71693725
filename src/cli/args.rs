//! CLI argument definitions using clap derive

use crate::bundle::Strictness;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// flowforge - pipeline configuration builder
///
/// Collects workflow configuration through interactive form pages and emits
/// the bundle of process files a pipeline host imports.
#[derive(Parser, Debug)]
#[command(name = "flowforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Session to operate on
    #[arg(short, long, global = true, default_value = "default")]
    pub session: String,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "FLOWFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Accept defaults instead of prompting
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Edit the workflow configuration interactively
    Edit,

    /// Print one artifact, or the whole bundle
    Show(ShowArgs),

    /// Check the configuration and report every issue
    Validate(ValidateArgs),

    /// Write the configuration artifacts to disk
    Export(ExportArgs),

    /// Load previously exported artifacts into the session
    Import(ImportArgs),

    /// Populate output files from a directory of example outputs
    Scan(ScanArgs),

    /// Step the configuration back one change
    Undo,

    /// Step the configuration forward one change
    Redo,

    /// Manage sessions
    Session(SessionArgs),

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Artifact file name (all artifacts when omitted)
    pub artifact: Option<String>,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Override the configured validation strictness
    #[arg(long, value_enum)]
    pub strictness: Option<Strictness>,
}

/// Arguments for the export command
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Output directory (defaults to the configured directory, then `.`)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Write one ZIP archive instead of individual files
    #[arg(long)]
    pub archive: bool,

    /// Override the configured validation strictness
    #[arg(long, value_enum)]
    pub strictness: Option<Strictness>,
}

/// Arguments for the import command
#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Artifact files to load (process-*.json, process-compute.config, preprocess.py)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments for the scan command
#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Directory holding example output files
    pub dir: PathBuf,

    /// File extensions to consider
    #[arg(long, value_delimiter = ',', default_value = "csv,tsv,txt")]
    pub ext: Vec<String>,
}

/// Arguments for the session command
#[derive(Parser, Debug)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub action: SessionAction,
}

/// Session subcommands
#[derive(Subcommand, Debug)]
pub enum SessionAction {
    /// List all sessions
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Clear the session's cached catalog lookups
    Refresh,

    /// Delete the session entirely
    Delete,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn session_flag_is_global() {
        let cli = Cli::try_parse_from(["flowforge", "show", "--session", "alpha"]).unwrap();
        assert_eq!(cli.session, "alpha");
    }

    #[test]
    fn import_requires_files() {
        assert!(Cli::try_parse_from(["flowforge", "import"]).is_err());
    }

    #[test]
    fn scan_extensions_split_on_commas() {
        let cli = Cli::try_parse_from(["flowforge", "scan", "/tmp/x", "--ext", "csv,tsv"]).unwrap();
        match cli.command {
            Commands::Scan(args) => assert_eq!(args.ext, vec!["csv", "tsv"]),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
