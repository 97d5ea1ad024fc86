//! The release engine

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument};

use shipyard_changelog::{prepend_release, release_heading, ChangelogStore, LogParse, ReleaseNotesRenderer};
use shipyard_core::config::ReleaseOptions;
use shipyard_core::error::Result;
use shipyard_core::hooks::SyncHook;
use shipyard_core::labels::{LabelDefinition, VersionLabelMap};
use shipyard_core::types::{BumpType, Commit};
use shipyard_git::LocalGit;
use shipyard_host::HostClient;

use crate::authors::resolve_authors;
use crate::context::ReleaseContext;
use crate::correlator::{already_released, Correlator};
use crate::labels::{self, LabelSyncReport};
use crate::semver::calculate_semver_bump;

/// Computes release metadata for a commit range
pub struct Release {
    git: Box<dyn LocalGit>,
    host: Arc<dyn HostClient>,
    changelog: Box<dyn ChangelogStore>,
    options: ReleaseOptions,
    version_map: VersionLabelMap,
    /// Taps run against the commit parser built for every invocation
    pub on_create_log_parse: SyncHook<LogParse>,
}

impl Release {
    /// Create an engine over a local repository, its host and a changelog
    pub fn new(
        git: impl LocalGit + 'static,
        host: Arc<dyn HostClient>,
        changelog: impl ChangelogStore + 'static,
        options: ReleaseOptions,
    ) -> Self {
        Self {
            git: Box::new(git),
            host,
            changelog: Box::new(changelog),
            version_map: options.version_map(),
            options,
            on_create_log_parse: SyncHook::new(),
        }
    }

    /// Options this engine was built with
    pub fn options(&self) -> &ReleaseOptions {
        &self.options
    }

    /// Label-to-keyword map in effect
    pub fn version_map(&self) -> &VersionLabelMap {
        &self.version_map
    }

    /// Changelog resource
    pub fn changelog(&self) -> &dyn ChangelogStore {
        self.changelog.as_ref()
    }

    fn log_parse(&self) -> LogParse {
        let mut log_parse = LogParse::new();
        self.on_create_log_parse.call(&mut log_parse);
        log_parse
    }

    /// Commits between `from` and `to`, normalized, correlated with their
    /// pull requests and with authors resolved, in log order.
    ///
    /// Host failures never fail the call; affected commits are left without
    /// a pull request or platform author.
    #[instrument(skip(self))]
    pub async fn get_commits(&self, from: Option<&str>, to: &str) -> Result<Vec<Commit>> {
        let mut seen = HashSet::new();
        let raw: Vec<_> = self
            .git
            .log(from, to)?
            .into_iter()
            .filter(|c| seen.insert(c.hash.clone()))
            .collect();
        debug!(count = raw.len(), "read commit log");

        let log_parse = self.log_parse();
        let mut commits = log_parse.normalize_commits(raw);

        let ctx = ReleaseContext::new();
        let host = self.host.as_ref();
        let correlator = Correlator::new(host, &ctx, self.options.concurrency);

        correlator.attach_referenced(&mut commits).await;

        // Commits that arrived through a referenced pull request are listed
        // under that pull request
        let in_pull_requests = correlator.referenced_hashes(&commits).await;
        commits.retain(|c| c.pull_request.is_some() || !in_pull_requests.contains(&c.hash));

        let anchor = correlator.anchor(self.git.as_ref(), &commits).await;
        correlator.match_merged(anchor.since, &mut commits).await;

        if let Some(last_tag) = &anchor.last_tag {
            commits.retain(|c| !already_released(self.git.as_ref(), last_tag, c));
        }

        correlator.match_by_hash(&mut commits).await;

        let ctx = &ctx;
        let commits: Vec<Commit> = stream::iter(commits)
            .map(|mut commit| async move {
                resolve_authors(ctx, host, &mut commit).await;
                commit
            })
            .buffered(self.options.concurrency.max(1))
            .collect()
            .await;

        let commits = log_parse.apply_omissions(commits);
        info!(count = commits.len(), "resolved commits");
        Ok(commits)
    }

    /// Bump implied by the range; `None` means no release
    #[instrument(skip(self))]
    pub async fn get_semver_bump(&self, from: Option<&str>, to: &str) -> Result<Option<BumpType>> {
        let commits = self.get_commits(from, to).await?;
        let bump = calculate_semver_bump(
            &commits,
            &self.version_map,
            self.options.only_publish_with_release_label,
        );

        info!(bump = bump.map(|b| b.as_str()).unwrap_or(""), "calculated version bump");
        Ok(bump)
    }

    /// Markdown release notes for the range
    #[instrument(skip(self))]
    pub async fn generate_release_notes(&self, from: Option<&str>, to: &str) -> Result<String> {
        let commits = self.get_commits(from, to).await?;
        Ok(ReleaseNotesRenderer::new(&self.options).render(&commits))
    }

    /// Prepend notes to the changelog under a heading for `current_tag`
    pub fn add_to_changelog(&self, notes: &str, previous_tag: &str, current_tag: &str) -> Result<()> {
        self.add_to_changelog_on(notes, previous_tag, current_tag, Utc::now().date_naive())
    }

    /// [`add_to_changelog`](Self::add_to_changelog) with an explicit date
    #[instrument(skip(self, notes))]
    pub fn add_to_changelog_on(
        &self,
        notes: &str,
        previous_tag: &str,
        current_tag: &str,
        date: NaiveDate,
    ) -> Result<()> {
        let heading = release_heading(previous_tag, current_tag, self.options.no_version_prefix, date);
        let existing = self.changelog.read()?;
        let content = prepend_release(existing.as_deref(), &heading, notes);

        self.changelog.write(&content)?;
        info!(heading = %heading, "updated changelog");
        Ok(())
    }

    /// Create or update the version labels on the host
    pub async fn add_labels_to_project(&self, labels: &[LabelDefinition]) -> Result<LabelSyncReport> {
        let report = labels::add_labels_to_project(
            self.host.as_ref(),
            labels,
            self.options.only_publish_with_release_label,
        )
        .await?;
        Ok(report)
    }
}

impl std::fmt::Debug for Release {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Release")
            .field("options", &self.options)
            .field("on_create_log_parse", &self.on_create_log_parse)
            .finish_non_exhaustive()
    }
}
