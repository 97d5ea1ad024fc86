//! Version command

use clap::Args;
use tracing::info;

use shipyard_changelog::MemoryChangelog;
use shipyard_core::version::next_tag;

use super::{Project, RangeArgs};
use crate::cli::{output, Cli, OutputFormat};

/// Print the version bump for a range
#[derive(Debug, Args)]
pub struct VersionCommand {
    #[command(flatten)]
    pub range: RangeArgs,
}

impl VersionCommand {
    /// Execute the version command
    pub async fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(from = ?self.range.from, to = %self.range.to, "executing version command");
        let project = Project::open()?;
        let from = project.from_ref(&self.range)?;
        let release = project.into_release(MemoryChangelog::new())?;

        let bump = release.get_semver_bump(from.as_deref(), &self.range.to).await?;
        let next = match (&from, bump) {
            (Some(tag), Some(bump)) => next_tag(tag, bump).ok(),
            _ => None,
        };
        let keyword = bump.map(|b| b.as_str()).unwrap_or("");

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "from": from,
                    "to": self.range.to,
                    "bump": keyword,
                    "next": next,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                println!("{}", keyword);
                if cli.verbose {
                    eprintln!("{}", output::key_value("Range", output::range(from.as_deref(), &self.range.to)));
                    eprintln!("{}", output::key_value("Bump", output::bump(bump)));
                    if let Some(next) = &next {
                        eprintln!("{}", output::key_value("Next", output::version_style().apply_to(next)));
                    }
                }
            }
        }

        Ok(())
    }
}
