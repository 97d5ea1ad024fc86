//! Label reconciliation against the host

use serde::Serialize;
use tracing::{debug, info, instrument};

use shipyard_core::labels::{LabelDefinition, ReleaseType};
use shipyard_host::{HostClient, Result};

/// Outcome of a label sync
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelSyncReport {
    /// Labels that did not exist and were created
    pub created: Vec<String>,
    /// Existing labels that were updated in place
    pub updated: Vec<String>,
    /// Label management page
    pub labels_url: String,
}

/// Labels that apply under the given publishing mode.
///
/// Release labels only matter when releases are opt-in, skip labels only
/// when they are opt-out.
pub fn applicable_labels(
    labels: &[LabelDefinition],
    only_publish_with_release_label: bool,
) -> Vec<&LabelDefinition> {
    labels
        .iter()
        .filter(|label| match label.release_type {
            ReleaseType::Release => only_publish_with_release_label,
            ReleaseType::Skip => !only_publish_with_release_label,
            _ => true,
        })
        .collect()
}

/// Make sure every applicable label exists on the host.
///
/// Existing labels are matched ignoring case and updated, which also fixes
/// their casing. Missing labels are created.
#[instrument(skip(host, labels), fields(count = labels.len()))]
pub async fn add_labels_to_project(
    host: &dyn HostClient,
    labels: &[LabelDefinition],
    only_publish_with_release_label: bool,
) -> Result<LabelSyncReport> {
    let existing = host.list_repository_labels().await?;
    let mut report = LabelSyncReport {
        labels_url: format!("{}/labels", host.project_url()),
        ..Default::default()
    };

    for label in applicable_labels(labels, only_publish_with_release_label) {
        match existing
            .iter()
            .find(|remote| remote.name.eq_ignore_ascii_case(&label.name))
        {
            Some(remote) => {
                debug!(label = %label.name, existing = %remote.name, "updating label");
                host.update_label(&remote.name, label).await?;
                report.updated.push(label.name.clone());
            }
            None => {
                debug!(label = %label.name, "creating label");
                host.create_label(label).await?;
                report.created.push(label.name.clone());
            }
        }
    }

    if !report.created.is_empty() {
        info!("Created labels: {}", report.created.join(", "));
        info!("\nYou can see these, and more at {}", report.labels_url);
    }

    Ok(report)
}
