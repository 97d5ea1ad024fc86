//! Labels command

use clap::Args;
use console::Style;
use tracing::info;

use shipyard_changelog::MemoryChangelog;

use super::Project;
use crate::cli::{output, Cli, OutputFormat};

/// Create or update the version labels on the repository
#[derive(Debug, Args)]
pub struct LabelsCommand {}

impl LabelsCommand {
    /// Execute the labels command
    pub async fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing labels command");
        let project = Project::open()?;
        let labels = project.config.release.label_definitions();
        let release = project.into_release(MemoryChangelog::new())?;

        let report = release.add_labels_to_project(&labels).await?;

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Text => {
                if cli.quiet {
                    return Ok(());
                }
                if report.created.is_empty() {
                    output::info("All labels already exist");
                } else {
                    output::success(&format!("Created {} label(s)", report.created.len()));
                }
                output::label_list("Created:", &report.created, &Style::new().green());
                output::label_list("Updated:", &report.updated, &Style::new().dim());
                println!();
                println!("You can see these, and more at {}", output::path_style().apply_to(&report.labels_url));
            }
        }

        Ok(())
    }
}
