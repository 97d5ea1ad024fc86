//! Commit normalization
//!
//! [`LogParse`] runs in two stages. [`LogParse::normalize_commits`] parses
//! pull request references and co-author trailers and runs the transform
//! taps. [`LogParse::apply_omissions`] runs once authors are resolved, so
//! omission taps can match on platform logins.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use shipyard_core::hooks::{BailHook, WaterfallHook};
use shipyard_core::types::{Author, Commit, PullRequestRef};
use shipyard_git::RawCommit;

/// Trailing `(#123)` reference added by squash merges
static SQUASH_REF_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<subject>.*?)\s*\(#(?P<number>\d+)\)\s*$").expect("Invalid regex")
});

/// Subject written by merge commits
static MERGE_REF_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Merge pull request #(?P<number>\d+) from \S+").expect("Invalid regex")
});

/// `Co-authored-by: Name <email>` trailer
static CO_AUTHOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^\s*co-authored-by:\s*(?P<name>.+?)\s*<(?P<email>[^>]+)>\s*$")
        .expect("Invalid regex")
});

/// Commit normalization pipeline with its tap points
#[derive(Debug, Default)]
pub struct LogParse {
    /// Rewrites each parsed commit
    pub parse_commit: WaterfallHook<Commit>,
    /// Drops a commit when any tap returns `true`
    pub omit_commit: BailHook<Commit>,
    /// Removes an author from a commit when any tap returns `true`
    pub omit_author: BailHook<Author>,
}

impl LogParse {
    /// Create a pipeline with no taps
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse raw log records, preserving order
    #[instrument(skip(self, raw), fields(count = raw.len()))]
    pub fn normalize_commits(&self, raw: Vec<RawCommit>) -> Vec<Commit> {
        raw.into_iter()
            .map(|r| self.parse_commit.call(parse_raw_commit(r)))
            .collect()
    }

    /// Apply omission taps to fully resolved commits
    pub fn apply_omissions(&self, commits: Vec<Commit>) -> Vec<Commit> {
        commits
            .into_iter()
            .filter(|commit| match self.omit_commit.call(commit) {
                Some(tap) => {
                    debug!(hash = %commit.hash, tap, "commit omitted");
                    false
                }
                None => true,
            })
            .map(|mut commit| {
                if !self.omit_author.is_empty() {
                    commit.authors.retain(|author| !self.omit_author.any(author));
                }
                commit
            })
            .collect()
    }
}

/// Build a commit from a raw log record
pub fn parse_raw_commit(raw: RawCommit) -> Commit {
    let (first_line, rest) = match raw.subject.split_once('\n') {
        Some((first, rest)) => (first.to_string(), Some(rest.to_string())),
        None => (raw.subject.clone(), None),
    };

    let mut pull_request = None;
    let mut subject = first_line.clone();

    if let Some(caps) = MERGE_REF_REGEX.captures(&first_line) {
        pull_request = caps["number"].parse().ok().map(PullRequestRef::new);
        if let Some(title) = raw
            .body
            .as_deref()
            .and_then(|b| b.lines().map(str::trim).find(|l| !l.is_empty()))
        {
            subject = title.to_string();
        }
    } else if let Some(caps) = SQUASH_REF_REGEX.captures(&first_line) {
        pull_request = caps["number"].parse().ok().map(PullRequestRef::new);
        subject = caps["subject"].to_string();
    }

    if let Some(rest) = &rest {
        subject = format!("{}\n{}", subject, rest);
    }

    let mut commit = Commit::new(
        raw.hash,
        subject,
        raw.author_name,
        raw.author_email,
        raw.timestamp,
    );
    commit.pull_request = pull_request;
    commit.files = raw.files;

    let message_tail = [rest.as_deref(), raw.body.as_deref()];
    for text in message_tail.into_iter().flatten() {
        for caps in CO_AUTHOR_REGEX.captures_iter(text) {
            commit.add_author(Author::from_git(&caps["name"], &caps["email"]));
        }
    }

    if let Some(body) = raw.body {
        commit = commit.with_body(body);
    }

    commit
}
