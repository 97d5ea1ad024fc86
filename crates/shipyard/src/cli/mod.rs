//! CLI definition and command handling

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use commands::{ChangelogCommand, LabelsCommand, ReleaseNotesCommand, VersionCommand};

/// Shipyard - Label-driven release automation
#[derive(Debug, Parser)]
#[command(name = "shipyard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the version bump implied by the merged pull requests
    Version(VersionCommand),

    /// Print release notes for a range of commits
    ReleaseNotes(ReleaseNotesCommand),

    /// Prepend release notes to the changelog
    Changelog(ChangelogCommand),

    /// Create or update the version labels on the repository
    Labels(LabelsCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        let rt = tokio::runtime::Runtime::new()?;
        match self.command {
            Commands::Version(ref cmd) => rt.block_on(cmd.execute(&self)),
            Commands::ReleaseNotes(ref cmd) => rt.block_on(cmd.execute(&self)),
            Commands::Changelog(ref cmd) => rt.block_on(cmd.execute(&self)),
            Commands::Labels(ref cmd) => rt.block_on(cmd.execute(&self)),
        }
    }
}
