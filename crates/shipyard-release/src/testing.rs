//! In-memory host and git fakes for engine tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use shipyard_core::error::{GitError, HostError};
use shipyard_core::labels::LabelDefinition;
use shipyard_git::{LocalGit, RawCommit};
use shipyard_host::*;

pub fn at(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0).unwrap()
}

/// Raw commit authored by Adam with the given message
pub fn raw(hash: &str, subject: &str) -> RawCommit {
    RawCommit::new(hash, subject, "Adam Dierkens", "adam@dierkens.com", at(1_600_000_000))
}

#[derive(Default)]
pub struct MockGit {
    pub commits: Vec<RawCommit>,
    pub empty_diffs: HashSet<String>,
    pub diff_fails: bool,
    pub first_commit: Option<DateTime<Utc>>,
    pub calls: Mutex<Vec<String>>,
}

impl MockGit {
    pub fn with_commits(commits: Vec<RawCommit>) -> Self {
        Self {
            commits,
            first_commit: Some(at(1_500_000_000)),
            ..Default::default()
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl LocalGit for MockGit {
    fn log(&self, from: Option<&str>, to: &str) -> shipyard_git::Result<Vec<RawCommit>> {
        self.record(format!("log:{}..{}", from.unwrap_or(""), to));
        Ok(self.commits.clone())
    }

    fn diff_is_empty(&self, a: &str, b: &str) -> shipyard_git::Result<bool> {
        self.record(format!("diff:{}..{}", a, b));
        if self.diff_fails {
            return Err(GitError::UnknownRevision(b.to_string()));
        }
        Ok(self.empty_diffs.contains(b))
    }

    fn first_commit_date(&self) -> shipyard_git::Result<DateTime<Utc>> {
        self.record("first_commit_date".to_string());
        self.first_commit.ok_or(GitError::NoCommits)
    }
}

#[derive(Default)]
pub struct MockHost {
    pub pull_requests: HashMap<u64, PullRequest>,
    pub pull_request_commits: HashMap<u64, Vec<PullRequestCommit>>,
    /// (query fragment, result); the first fragment contained in a query wins
    pub searches: Vec<(String, SearchResult)>,
    pub latest_release: Option<LatestRelease>,
    pub users: HashMap<String, User>,
    pub commit_authors: HashMap<String, String>,
    pub labels: Vec<RemoteLabel>,
    /// Latency of pull request lookups, by number
    pub delays: HashMap<u64, Duration>,
    /// Every remote call fails
    pub unreachable: bool,
    pub calls: Mutex<Vec<String>>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Default::default()
        }
    }

    pub fn with_pull_request(mut self, pr: PullRequest) -> Self {
        self.pull_requests.insert(pr.number, pr);
        self
    }

    pub fn with_pull_request_commits(mut self, number: u64, commits: Vec<PullRequestCommit>) -> Self {
        self.pull_request_commits.insert(number, commits);
        self
    }

    pub fn with_search(mut self, fragment: &str, result: SearchResult) -> Self {
        self.searches.push((fragment.to_string(), result));
        self
    }

    pub fn with_latest_release(mut self, tag: &str, published_at: DateTime<Utc>) -> Self {
        self.latest_release = Some(LatestRelease {
            tag_name: tag.to_string(),
            published_at,
        });
        self
    }

    pub fn with_user(mut self, login: &str, name: &str) -> Self {
        self.users.insert(
            login.to_string(),
            User {
                login: login.to_string(),
                name: Some(name.to_string()),
                email: None,
            },
        );
        self
    }

    pub fn with_commit_author(mut self, hash: &str, login: &str) -> Self {
        self.commit_authors.insert(hash.to_string(), login.to_string());
        self
    }

    pub fn with_delay(mut self, number: u64, millis: u64) -> Self {
        self.delays.insert(number, Duration::from_millis(millis));
        self
    }

    pub fn with_label(mut self, name: &str) -> Self {
        self.labels.push(RemoteLabel {
            name: name.to_string(),
            description: None,
            color: "ededed".to_string(),
        });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    async fn latency(&self, number: u64) {
        if let Some(delay) = self.delays.get(&number) {
            tokio::time::sleep(*delay).await;
        }
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.unreachable {
            return Err(HostError::Request("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl HostClient for MockHost {
    fn owner(&self) -> &str {
        "web"
    }

    fn repo(&self) -> &str {
        "site"
    }

    fn project_url(&self) -> String {
        "https://github.com/web/site".to_string()
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        self.record(format!("get_pull_request:{}", number))?;
        self.latency(number).await;
        self.pull_requests
            .get(&number)
            .cloned()
            .ok_or_else(|| HostError::NotFound(format!("pull request {}", number)))
    }

    async fn get_commits_for_pull_request(
        &self,
        number: u64,
    ) -> Result<Option<Vec<PullRequestCommit>>> {
        self.record(format!("get_commits_for_pull_request:{}", number))?;
        self.latency(number).await;
        Ok(self.pull_request_commits.get(&number).cloned())
    }

    async fn search_pull_requests(&self, query: &str) -> Result<SearchResult> {
        self.record(format!("search_pull_requests:{}", query))?;
        Ok(self
            .searches
            .iter()
            .find(|(fragment, _)| query.contains(fragment.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_default())
    }

    async fn get_latest_release(&self) -> Result<Option<LatestRelease>> {
        self.record("get_latest_release".to_string())?;
        Ok(self.latest_release.clone())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.record(format!("get_user_by_username:{}", username))?;
        Ok(self.users.get(username).cloned())
    }

    async fn get_commit_detail(&self, hash: &str) -> Result<CommitDetail> {
        self.record(format!("get_commit_detail:{}", hash))?;
        Ok(CommitDetail {
            sha: hash.to_string(),
            author_login: self.commit_authors.get(hash).cloned(),
        })
    }

    async fn list_repository_labels(&self) -> Result<Vec<RemoteLabel>> {
        self.record("list_repository_labels".to_string())?;
        Ok(self.labels.clone())
    }

    async fn create_label(&self, label: &LabelDefinition) -> Result<()> {
        self.record(format!("create_label:{}", label.name))
    }

    async fn update_label(&self, existing: &str, label: &LabelDefinition) -> Result<()> {
        self.record(format!("update_label:{}->{}", existing, label.name))
    }
}
