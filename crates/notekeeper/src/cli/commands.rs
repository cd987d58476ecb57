//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::config::BackendKind;
use crate::note::NoteId;

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Id of the note
    pub id: NoteId,
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Note title
    #[arg(short, long)]
    pub title: String,

    /// Note content
    #[arg(short = 'C', long)]
    pub content: String,
}

/// Edit command arguments.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Id of the note
    pub id: NoteId,

    /// New title
    #[arg(short, long)]
    pub title: Option<String>,

    /// New content
    #[arg(short = 'C', long)]
    pub content: Option<String>,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Id of the note
    pub id: NoteId,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to listen on (default from configuration)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// JSON file holding the served collections
    #[arg(long, value_name = "FILE")]
    pub db: Option<PathBuf>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Backend argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// Local database
    Local,
    /// Notes server
    Remote,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Local => Self::Local,
            BackendArg::Remote => Self::Remote,
        }
    }
}
