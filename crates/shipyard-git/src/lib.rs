//! Shipyard Git - Local repository access for release computation
//!
//! This crate reads commit history, compares trees and discovers the
//! hosting coordinates of a repository. The release engine consumes it
//! through the [`LocalGit`] trait so tests can substitute a fake history.

mod commits;
mod diff;
mod remote;
mod repository;
mod tags;
pub mod types;

use chrono::{DateTime, Utc};

pub use remote::{parse_remote_url, RemoteSlug};
pub use repository::{GitRepo, Result};
pub use types::RawCommit;

/// Local version-control operations used by the release engine
pub trait LocalGit: Send {
    /// Commits reachable from `to` but not from `from`, newest first.
    /// `from = None` walks the whole history.
    fn log(&self, from: Option<&str>, to: &str) -> Result<Vec<RawCommit>>;

    /// Whether the trees of two revisions are identical
    fn diff_is_empty(&self, a: &str, b: &str) -> Result<bool>;

    /// Authored date of the first commit in the repository
    fn first_commit_date(&self) -> Result<DateTime<Utc>>;
}

impl LocalGit for GitRepo {
    fn log(&self, from: Option<&str>, to: &str) -> Result<Vec<RawCommit>> {
        self.commits_between(from, to)
    }

    fn diff_is_empty(&self, a: &str, b: &str) -> Result<bool> {
        self.trees_equal(a, b)
    }

    fn first_commit_date(&self) -> Result<DateTime<Utc>> {
        self.root_commit().map(|c| c.timestamp)
    }
}
