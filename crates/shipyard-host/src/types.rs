//! Host record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pull request as recorded by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Pull request number
    pub number: u64,
    /// Title
    pub title: String,
    /// Hash of the merge or squash commit on the base branch
    pub merge_commit_sha: Option<String>,
    /// Label names
    pub labels: Vec<String>,
    /// Login of the user who opened it
    pub submitter: Option<String>,
    /// Whether it was merged
    pub merged: bool,
}

impl PullRequest {
    /// Create a pull request record
    pub fn new(number: u64) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }

    /// Set the merge commit hash
    pub fn with_merge_commit_sha(mut self, sha: impl Into<String>) -> Self {
        self.merge_commit_sha = Some(sha.into());
        self.merged = true;
        self
    }

    /// Set the labels
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Set the submitter
    pub fn with_submitter(mut self, login: impl Into<String>) -> Self {
        self.submitter = Some(login.into());
        self
    }
}

/// A commit listed on a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestCommit {
    /// Commit hash
    pub sha: String,
    /// Platform login of the author, when the host linked one
    pub author_login: Option<String>,
    /// Git author email
    pub author_email: Option<String>,
}

impl PullRequestCommit {
    /// Create a pull request commit entry
    pub fn new(sha: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            author_login: None,
            author_email: None,
        }
    }

    /// Set the author identity
    pub fn with_author(mut self, login: impl Into<String>, email: impl Into<String>) -> Self {
        self.author_login = Some(login.into());
        self.author_email = Some(email.into());
        self
    }
}

/// One search hit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    /// Pull request number, if the host returned one
    pub number: Option<u64>,
    /// `open` or `closed`
    pub state: String,
    /// Label names
    pub labels: Vec<String>,
    /// Whether the pull request was merged
    pub merged: bool,
}

impl SearchItem {
    /// Closed without being merged
    pub fn is_abandoned(&self) -> bool {
        self.state == "closed" && !self.merged
    }
}

/// Result of a pull request search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Hits on this page
    pub items: Vec<SearchItem>,
    /// Total hits across all pages
    pub total_count: u64,
}

/// The most recent published release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestRelease {
    /// Tag the release was cut from
    pub tag_name: String,
    /// Publish time
    pub published_at: DateTime<Utc>,
}

/// A platform user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login
    pub login: String,
    /// Display name
    pub name: Option<String>,
    /// Public email
    pub email: Option<String>,
}

/// Host-side details of a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDetail {
    /// Commit hash
    pub sha: String,
    /// Platform login of the author, when the host linked one
    pub author_login: Option<String>,
}

/// A label as it exists on the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteLabel {
    /// Label name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Hex color without `#`
    pub color: String,
}
