//! Reduction of commit labels to a version bump

use tracing::debug;

use shipyard_core::labels::{ReleaseType, VersionLabelMap};
use shipyard_core::types::{BumpType, Commit};

/// Reduce the labels on a set of commits to a single bump.
///
/// A commit carrying a skip label is left out of the reduction without
/// affecting the others. The highest remaining bump wins. When no commit
/// carries a bump label the result defaults to a patch, unless some commit
/// was skipped or every remaining commit is labelled as carrying no release
/// meaning. `None` means "do not release".
pub fn calculate_semver_bump(
    commits: &[Commit],
    version_map: &VersionLabelMap,
    only_publish_with_release_label: bool,
) -> Option<BumpType> {
    if commits.is_empty() {
        return None;
    }

    if only_publish_with_release_label
        && !commits
            .iter()
            .any(|c| version_map.matches(&c.labels, &ReleaseType::Release))
    {
        debug!("no commit carries a release label");
        return None;
    }

    let mut skipped = false;
    let mut quiet = true;
    let mut highest = None;

    for commit in commits {
        if version_map.matches(&commit.labels, &ReleaseType::Skip) {
            debug!(hash = %commit.hash, "commit skipped for bump");
            skipped = true;
            continue;
        }

        let recognised = version_map.recognised(&commit.labels);
        if recognised.is_empty() || recognised.iter().any(|t| **t != ReleaseType::None) {
            quiet = false;
        }

        highest = highest.max(version_map.bump_for(&commit.labels));
    }

    match highest {
        Some(bump) => Some(bump),
        None if skipped || quiet => None,
        None => Some(BumpType::Patch),
    }
}
