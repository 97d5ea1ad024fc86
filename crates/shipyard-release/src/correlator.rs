//! Pull request correlation
//!
//! Commits are matched to pull requests in tiers. A commit whose message
//! references a pull request is attached directly. The rest are matched
//! against the merge commits of pull requests merged since the last release,
//! and finally by searching for the commit hash itself. Every lookup is
//! bounded by the configured concurrency and results are applied in log
//! order.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, instrument, warn};

use shipyard_core::types::{Commit, PullRequestRef};
use shipyard_git::LocalGit;
use shipyard_host::{HostClient, PullRequest, QueryTerm, SearchQuery, SearchResult};

use crate::context::ReleaseContext;

/// Where the merged pull request search starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SearchAnchor {
    /// Start of the merge window
    pub since: DateTime<Utc>,
    /// Tag of the last published release, when there is one
    pub last_tag: Option<String>,
}

/// Copy a pull request's record onto a commit
pub(crate) fn attach(commit: &mut Commit, pr: &PullRequest) {
    commit.pull_request = Some(PullRequestRef {
        number: pr.number,
        merge_commit_sha: pr.merge_commit_sha.clone(),
        submitter: pr.submitter.clone(),
    });
    commit.labels = pr.labels.clone();
}

pub(crate) struct Correlator<'a> {
    host: &'a dyn HostClient,
    ctx: &'a ReleaseContext,
    concurrency: usize,
}

impl<'a> Correlator<'a> {
    pub fn new(host: &'a dyn HostClient, ctx: &'a ReleaseContext, concurrency: usize) -> Self {
        Self {
            host,
            ctx,
            concurrency: concurrency.max(1),
        }
    }

    async fn pull_requests(&self, numbers: Vec<Option<u64>>) -> Vec<Option<PullRequest>> {
        stream::iter(numbers)
            .map(|number| async move {
                match number {
                    Some(number) => self.ctx.pull_request(self.host, number).await,
                    None => None,
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// Attach the referenced pull request to every commit that names one.
    /// A failed lookup leaves the bare reference in place.
    #[instrument(skip(self, commits))]
    pub async fn attach_referenced(&self, commits: &mut [Commit]) {
        let numbers = commits.iter().map(Commit::pr_number).collect();
        let prs = self.pull_requests(numbers).await;

        for (commit, pr) in commits.iter_mut().zip(prs) {
            if let Some(pr) = pr {
                attach(commit, &pr);
            }
        }
    }

    /// Hashes of the commits listed on every referenced pull request
    pub async fn referenced_hashes(&self, commits: &[Commit]) -> HashSet<String> {
        let mut numbers: Vec<u64> = commits.iter().filter_map(Commit::pr_number).collect();
        numbers.sort_unstable();
        numbers.dedup();

        let lists: Vec<_> = stream::iter(numbers)
            .map(|number| self.ctx.pull_request_commits(self.host, number))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        lists
            .into_iter()
            .flatten()
            .map(|commit| commit.sha)
            .collect()
    }

    /// Start of the search window: the last release, else the first commit
    /// in the repository, else the oldest commit in range
    pub async fn anchor(&self, git: &dyn LocalGit, commits: &[Commit]) -> SearchAnchor {
        match self.host.get_latest_release().await {
            Ok(Some(release)) => {
                return SearchAnchor {
                    since: release.published_at,
                    last_tag: Some(release.tag_name),
                }
            }
            Ok(None) => debug!("no previous release"),
            Err(e) => warn!(error = %e, "failed to fetch latest release"),
        }

        let since = match git.first_commit_date() {
            Ok(date) => date,
            Err(e) => {
                warn!(error = %e, "failed to read first commit date");
                commits
                    .iter()
                    .map(|c| c.authored_at)
                    .min()
                    .unwrap_or_else(Utc::now)
            }
        };

        SearchAnchor {
            since,
            last_tag: None,
        }
    }

    /// Match commits without a pull request against the merge commits of
    /// pull requests merged since `since`. Catches squashed and rebased
    /// history whose hashes are not on the pull request itself.
    #[instrument(skip(self, commits))]
    pub async fn match_merged(&self, since: DateTime<Utc>, commits: &mut [Commit]) {
        let pending: Vec<usize> = unreferenced(commits);
        if pending.is_empty() {
            return;
        }

        let logins: Vec<String> = stream::iter(pending.iter().map(|&i| commits[i].hash.clone()))
            .map(|hash| async move { self.ctx.commit_author(self.host, &hash).await })
            .buffered(self.concurrency)
            .filter_map(|login| async move { login })
            .collect()
            .await;

        // Without an author filter the search would cover every merged pull
        // request in the window
        if logins.is_empty() {
            debug!(pending = pending.len(), "no commit author resolved, skipping merged search");
            return;
        }

        let query = logins
            .into_iter()
            .fold(SearchQuery::new(self.host.owner(), self.host.repo(), since), |q, login| {
                q.author(login)
            });

        let Some(result) = self.search(&query.to_string()).await else {
            return;
        };

        let numbers = result
            .items
            .iter()
            .filter(|item| !item.is_abandoned())
            .map(|item| item.number)
            .collect();
        let prs = self.pull_requests(numbers).await;

        let by_merge_commit: HashMap<&str, &PullRequest> = prs
            .iter()
            .flatten()
            .filter_map(|pr| pr.merge_commit_sha.as_deref().map(|sha| (sha, pr)))
            .collect();

        for i in pending {
            if let Some(pr) = by_merge_commit.get(commits[i].hash.as_str()).copied() {
                debug!(hash = %commits[i].hash, number = pr.number, "matched merge commit");
                attach(&mut commits[i], pr);
            }
        }
    }

    /// Search for each remaining commit by its hash. A single live result
    /// is accepted.
    #[instrument(skip(self, commits))]
    pub async fn match_by_hash(&self, commits: &mut [Commit]) {
        let pending = unreferenced(commits);
        let owner = self.host.owner();
        let repo = self.host.repo();

        let results: Vec<Option<SearchResult>> = stream::iter(pending.iter().map(|&i| commits[i].hash.clone()))
            .map(|hash| async move {
                let query = [
                    QueryTerm::qualifier("repo", format!("{}/{}", owner, repo)),
                    QueryTerm::qualifier("is", "pr"),
                    QueryTerm::Text(hash),
                ]
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ");
                self.search(&query).await
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        for (i, result) in pending.into_iter().zip(results) {
            let Some(result) = result.filter(|r| r.total_count == 1) else {
                continue;
            };
            let Some(item) = result.items.first().filter(|item| !item.is_abandoned()) else {
                continue;
            };

            let commit = &mut commits[i];
            debug!(hash = %commit.hash, number = ?item.number, "matched by hash search");
            if let Some(number) = item.number {
                commit.pull_request = Some(PullRequestRef::new(number));
            }
            commit.labels = item.labels.clone();
        }
    }

    async fn search(&self, query: &str) -> Option<SearchResult> {
        match self.host.search_pull_requests(query).await {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(query, error = %e, "pull request search failed");
                None
            }
        }
    }
}

fn unreferenced(commits: &[Commit]) -> Vec<usize> {
    commits
        .iter()
        .enumerate()
        .filter(|(_, c)| c.pull_request.is_none())
        .map(|(i, _)| i)
        .collect()
}

/// Whether a commit is the merge commit of its pull request and its tree
/// matches the last release, meaning it shipped under another hash.
/// A failed diff counts as not released.
pub(crate) fn already_released(git: &dyn LocalGit, last_tag: &str, commit: &Commit) -> bool {
    let is_merge_commit = commit
        .pull_request
        .as_ref()
        .and_then(|pr| pr.merge_commit_sha.as_deref())
        .is_some_and(|sha| sha == commit.hash);
    if !is_merge_commit {
        return false;
    }

    match git.diff_is_empty(last_tag, &commit.hash) {
        Ok(empty) => {
            if empty {
                debug!(hash = %commit.hash, last_tag, "commit already released");
            }
            empty
        }
        Err(e) => {
            warn!(hash = %commit.hash, error = %e, "failed to diff against last release");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at, MockGit, MockHost};
    use shipyard_host::{PullRequestCommit, SearchItem};

    fn commit(hash: &str, subject: &str) -> Commit {
        Commit::new(hash, subject, "Adam Dierkens", "adam@dierkens.com", at(1_600_000_000))
    }

    fn item(number: Option<u64>, merged: bool, labels: &[&str]) -> SearchItem {
        SearchItem {
            number,
            state: "closed".to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            merged,
        }
    }

    #[tokio::test]
    async fn test_attach_referenced_pull_request() {
        let host = MockHost::new().with_pull_request(
            PullRequest::new(123)
                .with_labels(["minor"])
                .with_submitter("adierkens"),
        );
        let ctx = ReleaseContext::new();
        let mut commits = vec![
            commit("a", "First").with_pull_request(PullRequestRef::new(123)),
            commit("b", "Second").with_pull_request(PullRequestRef::new(999)),
        ];

        Correlator::new(&host, &ctx, 4)
            .attach_referenced(&mut commits)
            .await;

        assert_eq!(commits[0].labels, vec!["minor"]);
        assert_eq!(
            commits[0].pull_request.as_ref().and_then(|pr| pr.submitter.as_deref()),
            Some("adierkens")
        );
        assert_eq!(commits[1].pr_number(), Some(999));
        assert!(commits[1].labels.is_empty());
    }

    #[tokio::test]
    async fn test_anchor_prefers_latest_release() {
        let host = MockHost::new().with_latest_release("v1.2.0", at(1_599_000_000));
        let ctx = ReleaseContext::new();
        let git = MockGit::with_commits(vec![]);

        let anchor = Correlator::new(&host, &ctx, 4).anchor(&git, &[]).await;

        assert_eq!(anchor.since, at(1_599_000_000));
        assert_eq!(anchor.last_tag.as_deref(), Some("v1.2.0"));
    }

    #[tokio::test]
    async fn test_anchor_falls_back_to_first_commit() {
        let host = MockHost::unreachable();
        let ctx = ReleaseContext::new();
        let git = MockGit::with_commits(vec![]);

        let anchor = Correlator::new(&host, &ctx, 4).anchor(&git, &[]).await;
        assert_eq!(anchor.since, at(1_500_000_000));
        assert_eq!(anchor.last_tag, None);

        let git = MockGit::default();
        let commits = vec![commit("a", "First")];
        let anchor = Correlator::new(&host, &ctx, 4).anchor(&git, &commits).await;
        assert_eq!(anchor.since, at(1_600_000_000));
    }

    #[tokio::test]
    async fn test_match_merged_uses_merge_commit_hash() {
        let host = MockHost::new()
            .with_commit_author("1a2b", "adierkens")
            .with_search(
                "is:merged",
                SearchResult {
                    items: vec![item(Some(124), true, &[])],
                    total_count: 1,
                },
            )
            .with_pull_request(
                PullRequest::new(124)
                    .with_merge_commit_sha("1a2b")
                    .with_labels(["skip-release", "minor"]),
            );
        let ctx = ReleaseContext::new();
        let mut commits = vec![commit("1a2b", "Rebased"), commit("3c4d", "Other")];

        Correlator::new(&host, &ctx, 4)
            .match_merged(at(1_500_000_000), &mut commits)
            .await;

        assert_eq!(commits[0].pr_number(), Some(124));
        assert_eq!(commits[0].labels, vec!["skip-release", "minor"]);
        assert_eq!(commits[1].pull_request, None);

        let searches: Vec<String> = host
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("search_pull_requests:"))
            .collect();
        assert_eq!(
            searches,
            vec!["search_pull_requests:repo:web/site is:pr is:merged merged:>=2017-07-14T02:40:00Z author:adierkens"]
        );
    }

    #[tokio::test]
    async fn test_match_merged_requires_an_author() {
        let host = MockHost::new().with_search(
            "is:merged",
            SearchResult {
                items: (1..=50).map(|n| item(Some(n), true, &[])).collect(),
                total_count: 50,
            },
        );
        let ctx = ReleaseContext::new();
        let mut commits = vec![commit("1a2b", "Unlinked author")];

        Correlator::new(&host, &ctx, 4)
            .match_merged(at(1_500_000_000), &mut commits)
            .await;

        assert_eq!(commits[0].pull_request, None);
        assert_eq!(host.count("get_commit_detail:"), 1);
        assert_eq!(host.count("search_pull_requests:"), 0);
        assert_eq!(host.count("get_pull_request:"), 0);
    }

    #[tokio::test]
    async fn test_match_by_hash_accepts_single_result() {
        let host = MockHost::new()
            .with_search(
                "is:pr 1a2b",
                SearchResult {
                    items: vec![item(None, true, &["minor"])],
                    total_count: 1,
                },
            )
            .with_search(
                "is:pr 3c4d",
                SearchResult {
                    items: vec![item(Some(7), false, &["major"])],
                    total_count: 1,
                },
            )
            .with_search(
                "is:pr 5e6f",
                SearchResult {
                    items: vec![item(Some(8), true, &[]), item(Some(9), true, &[])],
                    total_count: 2,
                },
            );
        let ctx = ReleaseContext::new();
        let mut commits = vec![
            commit("1a2b", "Found"),
            commit("3c4d", "Abandoned"),
            commit("5e6f", "Ambiguous"),
        ];

        Correlator::new(&host, &ctx, 4).match_by_hash(&mut commits).await;

        assert_eq!(commits[0].labels, vec!["minor"]);
        assert_eq!(commits[0].pull_request, None);
        assert!(commits[1].labels.is_empty());
        assert!(commits[2].labels.is_empty());
    }

    #[tokio::test]
    async fn test_referenced_hashes_tolerates_failures() {
        let host = MockHost::new().with_pull_request_commits(
            123,
            vec![PullRequestCommit::new("1a2b"), PullRequestCommit::new("3c4d")],
        );
        let ctx = ReleaseContext::new();
        let commits = vec![
            commit("a", "First").with_pull_request(PullRequestRef::new(123)),
            commit("b", "Second").with_pull_request(PullRequestRef::new(124)),
        ];

        let hashes = Correlator::new(&host, &ctx, 4).referenced_hashes(&commits).await;

        assert_eq!(hashes.len(), 2);
        assert!(hashes.contains("1a2b"));
    }

    #[test]
    fn test_already_released_requires_merge_commit_and_empty_diff() {
        let mut git = MockGit::with_commits(vec![]);
        git.empty_diffs.insert("1a2b".to_string());

        let merged = commit("1a2b", "Shipped").with_pull_request(PullRequestRef {
            number: 124,
            merge_commit_sha: Some("1a2b".to_string()),
            submitter: None,
        });
        let unmerged = commit("1a2b", "Shipped").with_pull_request(PullRequestRef::new(124));

        assert!(already_released(&git, "v1.0.0", &merged));
        assert!(!already_released(&git, "v1.0.0", &unmerged));

        git.diff_fails = true;
        assert!(!already_released(&git, "v1.0.0", &merged));
    }
}
