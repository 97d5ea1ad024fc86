//! Commit history operations

use chrono::{TimeZone, Utc};
use git2::{DiffOptions, Sort};
use tracing::{debug, instrument};

use crate::repository::{GitRepo, Result};
use crate::types::RawCommit;
use shipyard_core::error::GitError;

impl GitRepo {
    /// Commits reachable from `to` but not from `from`, newest first
    #[instrument(skip(self), fields(from, to))]
    pub fn commits_between(&self, from: Option<&str>, to: &str) -> Result<Vec<RawCommit>> {
        let head = self.resolve_commit(to)?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(head.id())?;
        if let Some(from) = from {
            revwalk.hide(self.resolve_commit(from)?.id())?;
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            commits.push(self.commit_to_raw(&commit)?);
        }

        debug!(count = commits.len(), "read commit log");
        Ok(commits)
    }

    /// The oldest commit reachable from HEAD
    pub fn root_commit(&self) -> Result<RawCommit> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
        revwalk.push(self.head_commit()?.id())?;

        let oid = revwalk.next().ok_or(GitError::NoCommits)??;
        let commit = self.repo.find_commit(oid)?;
        self.commit_to_raw(&commit)
    }

    /// Paths changed by a commit relative to its first parent
    fn changed_files(&self, commit: &git2::Commit<'_>) -> Result<Vec<String>> {
        let tree = commit.tree()?;
        let parent_tree = match commit.parent(0) {
            Ok(parent) => Some(parent.tree()?),
            Err(_) => None,
        };

        let mut opts = DiffOptions::new();
        let diff =
            self.repo
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;

        Ok(diff
            .deltas()
            .filter_map(|delta| delta.new_file().path().or_else(|| delta.old_file().path()))
            .map(|path| path.to_string_lossy().into_owned())
            .collect())
    }

    fn commit_to_raw(&self, commit: &git2::Commit<'_>) -> Result<RawCommit> {
        let author = commit.author();

        let timestamp = Utc
            .timestamp_opt(author.when().seconds(), 0)
            .single()
            .unwrap_or_else(Utc::now);

        let raw = RawCommit::new(
            commit.id().to_string(),
            commit.summary().unwrap_or_default(),
            author.name().unwrap_or("Unknown"),
            author.email().unwrap_or_default(),
            timestamp,
        )
        .with_body(commit.body().unwrap_or_default())
        .with_files(self.changed_files(commit)?);

        Ok(raw)
    }
}
