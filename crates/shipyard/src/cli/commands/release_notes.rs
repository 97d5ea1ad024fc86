//! Release notes command

use clap::Args;
use tracing::info;

use shipyard_changelog::MemoryChangelog;

use super::{Project, RangeArgs};
use crate::cli::{output, Cli, OutputFormat};

/// Print release notes for a range
#[derive(Debug, Args)]
pub struct ReleaseNotesCommand {
    #[command(flatten)]
    pub range: RangeArgs,
}

impl ReleaseNotesCommand {
    /// Execute the release notes command
    pub async fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(from = ?self.range.from, to = %self.range.to, "executing release-notes command");
        let project = Project::open()?;
        let from = project.from_ref(&self.range)?;
        let release = project.into_release(MemoryChangelog::new())?;

        let notes = release
            .generate_release_notes(from.as_deref(), &self.range.to)
            .await?;

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "from": from,
                    "to": self.range.to,
                    "notes": notes,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text if notes.is_empty() => {
                if !cli.quiet {
                    output::warning("No changes found in range");
                }
            }
            OutputFormat::Text => println!("{}", notes),
        }

        Ok(())
    }
}
