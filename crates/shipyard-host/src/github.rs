//! GitHub REST client
//!
//! ## Authentication
//!
//! Uses the `GITHUB_TOKEN` or `GH_TOKEN` environment variable. Anonymous
//! access works for public repositories within the unauthenticated rate
//! limit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use shipyard_core::error::HostError;
use shipyard_core::labels::LabelDefinition;

use crate::traits::{HostClient, Result};
use crate::types::*;

const USER_AGENT: &str = concat!("shipyard/", env!("CARGO_PKG_VERSION"));
const PAGE_SIZE: usize = 100;

/// GitHub client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// REST API base URL
    pub api_url: String,
    /// Web base URL
    pub web_url: String,
    /// API token
    #[serde(skip)]
    pub token: Option<String>,
}

impl GitHubConfig {
    /// Configuration for github.com
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            api_url: "https://api.github.com".to_string(),
            web_url: "https://github.com".to_string(),
            token: None,
        }
    }

    /// Set the API and web base URLs
    pub fn with_urls(mut self, api_url: impl Into<String>, web_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self.web_url = web_url.into();
        self
    }

    /// Set the token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Read the token from the environment
    pub fn with_env_token(mut self) -> Self {
        self.token = ["GITHUB_TOKEN", "GH_TOKEN"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|token| !token.is_empty());
        if self.token.is_some() {
            debug!("loaded GitHub token from environment");
        }
        self
    }
}

/// GitHub implementation of [`HostClient`]
pub struct GitHubClient {
    config: GitHubConfig,
    client: Client,
}

impl GitHubClient {
    /// Create a new client
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(request_error)?;

        Ok(Self { config, client })
    }

    /// Build an API URL from path segments; segments are percent-encoded
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.api_url)
            .map_err(|e| HostError::Request(format!("invalid API URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| HostError::Request("API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    fn repo_url(&self, segments: &[&str]) -> Result<Url> {
        let mut full = vec!["repos", self.config.owner.as_str(), self.config.repo.as_str()];
        full.extend_from_slice(segments);
        self.url(&full)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");

        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(request_error)?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let message = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => HostError::NotFound(url),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => HostError::Authentication(message),
            _ => HostError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.send(self.request(Method::GET, url)).await?;
        response
            .json()
            .await
            .map_err(|e| HostError::Decode(e.to_string()))
    }

    /// GET that maps a 404 to `None`
    async fn get_optional<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        match self.get_json(url).await {
            Ok(value) => Ok(Some(value)),
            Err(HostError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn request_error(e: reqwest::Error) -> HostError {
    HostError::Request(e.to_string())
}

// Wire formats

#[derive(Debug, Deserialize)]
struct WireLabel {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    color: String,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct WirePullRequest {
    number: u64,
    #[serde(default)]
    title: String,
    merge_commit_sha: Option<String>,
    #[serde(default)]
    labels: Vec<WireLabel>,
    user: Option<WireUser>,
    merged_at: Option<DateTime<Utc>>,
}

impl From<WirePullRequest> for PullRequest {
    fn from(pr: WirePullRequest) -> Self {
        Self {
            number: pr.number,
            title: pr.title,
            merge_commit_sha: pr.merge_commit_sha,
            labels: pr.labels.into_iter().map(|l| l.name).collect(),
            submitter: pr.user.map(|u| u.login),
            merged: pr.merged_at.is_some(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireGitIdentity {
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireGitCommit {
    author: Option<WireGitIdentity>,
}

#[derive(Debug, Deserialize)]
struct WireCommit {
    sha: String,
    author: Option<WireUser>,
    commit: Option<WireGitCommit>,
}

impl From<WireCommit> for PullRequestCommit {
    fn from(c: WireCommit) -> Self {
        Self {
            sha: c.sha,
            author_login: c.author.map(|u| u.login),
            author_email: c.commit.and_then(|g| g.author).and_then(|a| a.email),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireIssueLink {
    merged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct WireSearchItem {
    number: Option<u64>,
    #[serde(default)]
    state: String,
    #[serde(default)]
    labels: Vec<WireLabel>,
    pull_request: Option<WireIssueLink>,
}

#[derive(Debug, Deserialize)]
struct WireSearch {
    total_count: u64,
    #[serde(default)]
    items: Vec<WireSearchItem>,
}

impl From<WireSearch> for SearchResult {
    fn from(search: WireSearch) -> Self {
        Self {
            total_count: search.total_count,
            items: search
                .items
                .into_iter()
                .map(|item| SearchItem {
                    number: item.number,
                    state: item.state,
                    labels: item.labels.into_iter().map(|l| l.name).collect(),
                    merged: item.pull_request.and_then(|p| p.merged_at).is_some(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireRelease {
    tag_name: String,
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct WireProfile {
    login: String,
    name: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Serialize)]
struct LabelPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_name: Option<&'a str>,
    color: &'a str,
    description: &'a str,
}

#[async_trait]
impl HostClient for GitHubClient {
    fn owner(&self) -> &str {
        &self.config.owner
    }

    fn repo(&self) -> &str {
        &self.config.repo
    }

    fn project_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.config.web_url.trim_end_matches('/'),
            self.config.owner,
            self.config.repo
        )
    }

    #[instrument(skip(self))]
    async fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        let url = self.repo_url(&["pulls", &number.to_string()])?;
        let pr: WirePullRequest = self.get_json(url).await?;
        Ok(pr.into())
    }

    #[instrument(skip(self))]
    async fn get_commits_for_pull_request(
        &self,
        number: u64,
    ) -> Result<Option<Vec<PullRequestCommit>>> {
        let mut url = self.repo_url(&["pulls", &number.to_string(), "commits"])?;
        url.query_pairs_mut()
            .append_pair("per_page", &PAGE_SIZE.to_string());

        let commits: Option<Vec<WireCommit>> = self.get_optional(url).await?;
        Ok(commits.map(|c| c.into_iter().map(Into::into).collect()))
    }

    #[instrument(skip(self))]
    async fn search_pull_requests(&self, query: &str) -> Result<SearchResult> {
        let mut url = self.url(&["search", "issues"])?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("per_page", &PAGE_SIZE.to_string());

        let search: WireSearch = self.get_json(url).await?;
        debug!(total = search.total_count, "search finished");
        Ok(search.into())
    }

    #[instrument(skip(self))]
    async fn get_latest_release(&self) -> Result<Option<LatestRelease>> {
        let url = self.repo_url(&["releases", "latest"])?;
        let release: Option<WireRelease> = self.get_optional(url).await?;

        Ok(release.and_then(|r| {
            r.published_at.map(|published_at| LatestRelease {
                tag_name: r.tag_name,
                published_at,
            })
        }))
    }

    #[instrument(skip(self))]
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let url = self.url(&["users", username])?;
        let profile: Option<WireProfile> = self.get_optional(url).await?;

        Ok(profile.map(|p| User {
            login: p.login,
            name: p.name,
            email: p.email,
        }))
    }

    #[instrument(skip(self))]
    async fn get_commit_detail(&self, hash: &str) -> Result<CommitDetail> {
        let url = self.repo_url(&["commits", hash])?;
        let commit: WireCommit = self.get_json(url).await?;

        Ok(CommitDetail {
            sha: commit.sha,
            author_login: commit.author.map(|u| u.login),
        })
    }

    #[instrument(skip(self))]
    async fn list_repository_labels(&self) -> Result<Vec<RemoteLabel>> {
        let mut labels = Vec::new();

        for page in 1.. {
            let mut url = self.repo_url(&["labels"])?;
            url.query_pairs_mut()
                .append_pair("per_page", &PAGE_SIZE.to_string())
                .append_pair("page", &page.to_string());

            let batch: Vec<WireLabel> = self.get_json(url).await?;
            let last_page = batch.len() < PAGE_SIZE;

            labels.extend(batch.into_iter().map(|l| RemoteLabel {
                name: l.name,
                description: l.description,
                color: l.color,
            }));

            if last_page {
                break;
            }
        }

        debug!(count = labels.len(), "listed repository labels");
        Ok(labels)
    }

    #[instrument(skip(self, label), fields(name = %label.name))]
    async fn create_label(&self, label: &LabelDefinition) -> Result<()> {
        let url = self.repo_url(&["labels"])?;
        let payload = LabelPayload {
            name: Some(&label.name),
            new_name: None,
            color: label.color(),
            description: &label.description,
        };

        self.send(self.request(Method::POST, url).json(&payload))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, label), fields(name = %label.name))]
    async fn update_label(&self, existing: &str, label: &LabelDefinition) -> Result<()> {
        let url = self.repo_url(&["labels", existing])?;
        let payload = LabelPayload {
            name: None,
            new_name: (existing != label.name).then_some(label.name.as_str()),
            color: label.color(),
            description: &label.description,
        };

        self.send(self.request(Method::PATCH, url).json(&payload))
            .await?;
        Ok(())
    }
}
