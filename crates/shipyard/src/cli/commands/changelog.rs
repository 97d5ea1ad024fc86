//! Changelog command

use clap::Args;
use console::style;
use tracing::info;

use shipyard_changelog::{ChangelogStore, FileChangelog, MemoryChangelog, ReleaseNotesRenderer};
use shipyard_core::types::BumpType;
use shipyard_core::version::{format_version, next_tag};
use shipyard_release::{calculate_semver_bump, Release};

use super::{Project, RangeArgs};
use crate::cli::{output, Cli, OutputFormat};

/// Tag assumed when the repository has never been tagged
const INITIAL_TAG: &str = "v0.0.0";

/// Prepend release notes to the changelog
#[derive(Debug, Args)]
pub struct ChangelogCommand {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Version the entry is for. When given, the heading is this tag bumped
    /// one patch unless it equals the previous tag. Defaults to the next
    /// version computed from the range.
    #[arg(long)]
    pub current: Option<String>,

    /// Print the new entry instead of writing the file
    #[arg(long)]
    pub dry_run: bool,
}

impl ChangelogCommand {
    /// Execute the changelog command
    pub async fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(from = ?self.range.from, current = ?self.current, dry_run = self.dry_run, "executing changelog command");
        let project = Project::open()?;
        let from = project.from_ref(&self.range)?;
        let path = project.changelog_path();

        if self.dry_run {
            let release = project.into_release(MemoryChangelog::new())?;
            let entry = self.write_entry(&release, from.as_deref()).await?;
            let content = release.changelog().read()?.unwrap_or_default();
            return self.output(cli, entry, None, &content);
        }

        let release = project.into_release(FileChangelog::new(&path))?;
        let entry = self.write_entry(&release, from.as_deref()).await?;
        self.output(cli, entry, Some(&path), "")
    }

    /// Render notes for the range and add them to the engine's changelog.
    /// Returns the heading version, or `None` when there was nothing to add.
    async fn write_entry(&self, release: &Release, from: Option<&str>) -> anyhow::Result<Option<String>> {
        let commits = release.get_commits(from, &self.range.to).await?;
        if commits.is_empty() {
            return Ok(None);
        }

        let notes = ReleaseNotesRenderer::new(release.options()).render(&commits);
        let previous = from.unwrap_or(INITIAL_TAG);

        let (previous, current) = match &self.current {
            Some(current) => (previous.to_string(), current.clone()),
            None => {
                let bump = calculate_semver_bump(
                    &commits,
                    release.version_map(),
                    release.options().only_publish_with_release_label,
                )
                .unwrap_or(BumpType::Patch);
                let next = match next_tag(previous, bump) {
                    Ok(next) => format_version(&next, release.options().no_version_prefix),
                    Err(_) => previous.to_string(),
                };
                (next.clone(), next)
            }
        };

        release.add_to_changelog(&notes, &previous, &current)?;
        Ok(Some(current))
    }

    fn output(
        &self,
        cli: &Cli,
        entry: Option<String>,
        path: Option<&std::path::Path>,
        preview: &str,
    ) -> anyhow::Result<()> {
        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "version": entry,
                    "file": path.map(|p| p.display().to_string()),
                    "written": path.is_some() && entry.is_some(),
                    "content": (!preview.is_empty()).then_some(preview),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => match (entry, path) {
                (None, _) => {
                    if !cli.quiet {
                        println!("{}", style("No commits found since last release.").yellow());
                    }
                }
                (Some(_), None) => print!("{}", preview),
                (Some(version), Some(path)) => {
                    if !cli.quiet {
                        output::success(&format!(
                            "Added {} to {}",
                            output::version_style().apply_to(&version),
                            output::path_style().apply_to(path.display())
                        ));
                    }
                }
            },
        }
        Ok(())
    }
}
