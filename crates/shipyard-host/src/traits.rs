//! Host client trait

use async_trait::async_trait;

use shipyard_core::error::HostError;
use shipyard_core::labels::LabelDefinition;

use crate::types::*;

/// Result type for host operations
pub type Result<T> = std::result::Result<T, HostError>;

/// Remote repository host
///
/// Implementations own retries and authentication; the engine treats any
/// returned error as final for that one call.
#[async_trait]
pub trait HostClient: Send + Sync {
    /// Repository owner
    fn owner(&self) -> &str;

    /// Repository name
    fn repo(&self) -> &str;

    /// Web URL of the repository
    fn project_url(&self) -> String;

    /// Fetch a pull request by number
    async fn get_pull_request(&self, number: u64) -> Result<PullRequest>;

    /// Commits on a pull request; `None` when the host has no record
    async fn get_commits_for_pull_request(
        &self,
        number: u64,
    ) -> Result<Option<Vec<PullRequestCommit>>>;

    /// Search pull requests with a host query string
    async fn search_pull_requests(&self, query: &str) -> Result<SearchResult>;

    /// Latest published release; `None` when the repository has none
    async fn get_latest_release(&self) -> Result<Option<LatestRelease>>;

    /// Look up a user by login
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Host-side details of a commit
    async fn get_commit_detail(&self, hash: &str) -> Result<CommitDetail>;

    /// All labels defined on the repository
    async fn list_repository_labels(&self) -> Result<Vec<RemoteLabel>>;

    /// Create a label
    async fn create_label(&self, label: &LabelDefinition) -> Result<()>;

    /// Update the label currently named `existing` to match `label`
    async fn update_label(&self, existing: &str, label: &LabelDefinition) -> Result<()>;
}
