//! Command-line interface for notekeeper.
//!
//! This module provides the CLI structure for the `notekeeper` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, BackendArg, ConfigCommand, DeleteCommand, EditCommand, ListCommand, ServeCommand,
    ShowCommand,
};

/// notekeeper - Keep short notes locally or on a notes server
///
/// Create, edit and delete notes with a title and content, stored either in
/// a local database or in a REST resource collection.
#[derive(Debug, Parser)]
#[command(name = "notekeeper")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Backend to use, overriding the configuration
    #[arg(short, long, global = true, value_enum)]
    pub backend: Option<BackendArg>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every note in full
    List(ListCommand),

    /// Show one note
    Show(ShowCommand),

    /// Create a note
    Add(AddCommand),

    /// Change a note's title or content
    Edit(EditCommand),

    /// Delete a note
    Delete(DeleteCommand),

    /// Interactive editing session
    Shell,

    /// Run a local notes server
    Serve(ServeCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }

    /// The backend to use: the flag if given, else the configured one.
    #[must_use]
    pub fn backend_kind(&self, config: &crate::Config) -> crate::config::BackendKind {
        self.backend
            .map_or(config.backend.kind, crate::config::BackendKind::from)
    }
}
