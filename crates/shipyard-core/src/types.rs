//! Core types for Shipyard

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Magnitude of a semantic version bump
///
/// Variants are declared in ascending order so `Ord` gives precedence
/// (`Major > Minor > Patch`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpType {
    /// Patch version bump (bug fixes)
    Patch,
    /// Minor version bump (new features)
    Minor,
    /// Major version bump (breaking changes)
    Major,
}

impl BumpType {
    /// Returns the string representation of the bump
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
        }
    }
}

impl std::fmt::Display for BumpType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BumpType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            _ => Err(format!("Unknown bump type: {}", s)),
        }
    }
}

/// A person credited on a commit
///
/// Either the platform identity (`username`) or the git identity
/// (`name`/`email`) may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Platform login
    pub username: Option<String>,
    /// Display or git author name
    pub name: Option<String>,
    /// Git author email
    pub email: Option<String>,
}

impl Author {
    /// Create an author from a git identity
    pub fn from_git(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: None,
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }

    /// Create an author from a platform login
    pub fn from_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            name: None,
            email: None,
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Two authors are the same person when their usernames or emails match
    pub fn same_person(&self, other: &Author) -> bool {
        let username_match = matches!(
            (&self.username, &other.username),
            (Some(a), Some(b)) if a.eq_ignore_ascii_case(b)
        );
        let email_match = matches!(
            (&self.email, &other.email),
            (Some(a), Some(b)) if a.eq_ignore_ascii_case(b)
        );

        username_match || email_match
    }

    /// Text used when rendering this author in release notes
    pub fn display(&self) -> Option<String> {
        match (&self.username, &self.name, &self.email) {
            (Some(username), _, _) => Some(format!("@{}", username)),
            (None, Some(name), _) => Some(name.clone()),
            (None, None, Some(email)) => Some(email.clone()),
            (None, None, None) => None,
        }
    }
}

/// Reference from a commit to the pull request that introduced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// Pull request number
    pub number: u64,
    /// Hash of the merge/squash commit on the base branch
    pub merge_commit_sha: Option<String>,
    /// Login of the user who opened the pull request
    pub submitter: Option<String>,
}

impl PullRequestRef {
    /// Create a reference with only a number
    pub fn new(number: u64) -> Self {
        Self {
            number,
            merge_commit_sha: None,
            submitter: None,
        }
    }
}

/// A normalized commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Commit hash
    pub hash: String,
    /// Subject line, with any trailing `(#N)` reference removed
    pub subject: String,
    /// Message body after the subject
    pub body: Option<String>,
    /// Raw git author name
    pub author_name: String,
    /// Raw git author email
    pub author_email: String,
    /// Authored timestamp
    pub authored_at: DateTime<Utc>,
    /// Resolved authors, including co-authors
    pub authors: Vec<Author>,
    /// Originating pull request
    pub pull_request: Option<PullRequestRef>,
    /// Labels attached through the pull request
    pub labels: Vec<String>,
    /// Paths touched by the commit
    pub files: Vec<String>,
}

impl Commit {
    /// Create a commit with a single git author
    pub fn new(
        hash: impl Into<String>,
        subject: impl Into<String>,
        author_name: impl Into<String>,
        author_email: impl Into<String>,
        authored_at: DateTime<Utc>,
    ) -> Self {
        let author_name = author_name.into();
        let author_email = author_email.into();

        Self {
            hash: hash.into(),
            subject: subject.into(),
            body: None,
            authors: vec![Author::from_git(&author_name, &author_email)],
            author_name,
            author_email,
            authored_at,
            pull_request: None,
            labels: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Set the body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Attach a pull request reference
    pub fn with_pull_request(mut self, pull_request: PullRequestRef) -> Self {
        self.pull_request = Some(pull_request);
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

    /// First line of the subject
    pub fn title(&self) -> &str {
        self.subject.lines().next().unwrap_or("").trim_end()
    }

    /// Pull request number, if one is attached
    pub fn pr_number(&self) -> Option<u64> {
        self.pull_request.as_ref().map(|pr| pr.number)
    }

    /// Whether any author carries a platform identity
    pub fn has_resolved_author(&self) -> bool {
        self.authors.iter().any(|a| a.username.is_some())
    }

    /// Add an author unless the same person is already credited
    pub fn add_author(&mut self, author: Author) {
        if !self.authors.iter().any(|a| a.same_person(&author)) {
            self.authors.push(author);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_bump_type_ordering() {
        assert!(BumpType::Major > BumpType::Minor);
        assert!(BumpType::Minor > BumpType::Patch);
        assert_eq!(
            [BumpType::Patch, BumpType::Major, BumpType::Minor]
                .into_iter()
                .max(),
            Some(BumpType::Major)
        );
    }

    #[test]
    fn test_bump_type_from_str() {
        assert_eq!(BumpType::from_str("MAJOR").unwrap(), BumpType::Major);
        assert_eq!(BumpType::from_str("patch").unwrap(), BumpType::Patch);
        assert!(BumpType::from_str("skip").is_err());
    }

    #[test]
    fn test_same_person_by_email_or_username() {
        let git = Author::from_git("Adam", "adam@example.com");
        let platform = Author::from_username("adam").with_email("ADAM@example.com");
        let other = Author::from_username("adam").with_name("Someone");

        assert!(git.same_person(&platform));
        assert!(platform.same_person(&other));
        assert!(!git.same_person(&other));
    }

    #[test]
    fn test_commit_title_strips_extra_lines() {
        let commit = Commit::new(
            "abc",
            "I should be included\nBut this should not.",
            "Adam",
            "adam@example.com",
            Utc::now(),
        );
        assert_eq!(commit.title(), "I should be included");
    }

    #[test]
    fn test_add_author_deduplicates() {
        let mut commit = Commit::new("abc", "subject", "Adam", "adam@example.com", Utc::now());
        commit.add_author(Author::from_git("Adam D.", "adam@example.com"));
        commit.add_author(Author::from_username("andrew"));

        assert_eq!(commit.authors.len(), 2);
    }
}
