//! Remote discovery

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::repository::{GitRepo, Result};
use shipyard_core::error::GitError;

/// Owner/name pair extracted from a remote URL
static REMOTE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[a-z+]+://)?(?:[^@/]+@)?(?P<host>[^:/]+)(?::\d+)?[:/](?P<owner>[^/]+)/(?P<repo>[^/]+?)(?:\.git)?/?$",
    )
    .expect("Invalid regex")
});

/// Hosting coordinates of a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSlug {
    /// Host name, e.g. `github.com`
    pub host: String,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
}

/// Parse an SSH, scp-style or HTTPS remote URL
pub fn parse_remote_url(url: &str) -> Option<RemoteSlug> {
    let caps = REMOTE_REGEX.captures(url.trim())?;
    Some(RemoteSlug {
        host: caps["host"].to_string(),
        owner: caps["owner"].to_string(),
        repo: caps["repo"].to_string(),
    })
}

impl GitRepo {
    /// Get the URL for a remote
    pub fn remote_url(&self, name: &str) -> Result<Option<String>> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(|s| s.to_string())),
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                Err(GitError::RemoteNotFound(name.to_string()))
            }
            Err(e) => Err(GitError::Git2(e)),
        }
    }

    /// Hosting coordinates of a remote
    pub fn remote_slug(&self, name: &str) -> Result<RemoteSlug> {
        let url = self
            .remote_url(name)?
            .ok_or_else(|| GitError::RemoteNotFound(name.to_string()))?;

        let slug = parse_remote_url(&url).ok_or_else(|| GitError::RemoteNotFound(url.clone()))?;
        debug!(remote = name, owner = %slug.owner, repo = %slug.repo, "parsed remote");
        Ok(slug)
    }
}
