//! Per-invocation lookup state

use tracing::{debug, warn};

use shipyard_host::{HostClient, PullRequest, PullRequestCommit, User};

use crate::cache::Memo;

/// Memoized host lookups shared by one engine invocation.
///
/// Failed lookups are logged and cached as absent, so one failing call is
/// never retried within the invocation.
#[derive(Debug, Default)]
pub struct ReleaseContext {
    pull_requests: Memo<u64, Option<PullRequest>>,
    pull_request_commits: Memo<u64, Vec<PullRequestCommit>>,
    commit_authors: Memo<String, Option<String>>,
    users: Memo<String, Option<User>>,
}

impl ReleaseContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Pull request by number
    pub async fn pull_request(&self, host: &dyn HostClient, number: u64) -> Option<PullRequest> {
        self.pull_requests
            .get_or_init(number, || async move {
                match host.get_pull_request(number).await {
                    Ok(pr) => Some(pr),
                    Err(e) => {
                        warn!(number, error = %e, "failed to fetch pull request");
                        None
                    }
                }
            })
            .await
    }

    /// Commits on a pull request; empty when the host has none or fails
    pub async fn pull_request_commits(
        &self,
        host: &dyn HostClient,
        number: u64,
    ) -> Vec<PullRequestCommit> {
        self.pull_request_commits
            .get_or_init(number, || async move {
                match host.get_commits_for_pull_request(number).await {
                    Ok(commits) => commits.unwrap_or_default(),
                    Err(e) => {
                        warn!(number, error = %e, "failed to fetch pull request commits");
                        Vec::new()
                    }
                }
            })
            .await
    }

    /// Platform login the host linked to a commit
    pub async fn commit_author(&self, host: &dyn HostClient, hash: &str) -> Option<String> {
        self.commit_authors
            .get_or_init(hash.to_string(), || async move {
                match host.get_commit_detail(hash).await {
                    Ok(detail) => detail.author_login.filter(|login| !login.is_empty()),
                    Err(e) => {
                        warn!(hash, error = %e, "failed to fetch commit detail");
                        None
                    }
                }
            })
            .await
    }

    /// User profile by login
    pub async fn user(&self, host: &dyn HostClient, login: &str) -> Option<User> {
        self.users
            .get_or_init(login.to_string(), || async move {
                match host.get_user_by_username(login).await {
                    Ok(user) => {
                        if user.is_none() {
                            debug!(login, "no user found");
                        }
                        user
                    }
                    Err(e) => {
                        warn!(login, error = %e, "failed to fetch user");
                        None
                    }
                }
            })
            .await
    }
}
