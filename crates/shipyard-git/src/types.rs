//! Git types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A commit as read from the local log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCommit {
    /// Commit hash (full)
    pub hash: String,
    /// First line of the message
    pub subject: String,
    /// Message after the subject, if any
    pub body: Option<String>,
    /// Author name
    pub author_name: String,
    /// Author email
    pub author_email: String,
    /// Authored timestamp
    pub timestamp: DateTime<Utc>,
    /// Paths touched relative to the first parent
    pub files: Vec<String>,
}

impl RawCommit {
    /// Create a new RawCommit
    pub fn new(
        hash: impl Into<String>,
        subject: impl Into<String>,
        author_name: impl Into<String>,
        author_email: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            hash: hash.into(),
            subject: subject.into(),
            body: None,
            author_name: author_name.into(),
            author_email: author_email.into(),
            timestamp,
            files: Vec::new(),
        }
    }

    /// Set the commit body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        self.body = (!body.trim().is_empty()).then_some(body);
        self
    }

    /// Set the touched files
    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = files;
        self
    }

    /// Short hash (first 7 characters)
    pub fn short_hash(&self) -> &str {
        let end = self
            .hash
            .char_indices()
            .nth(7)
            .map_or(self.hash.len(), |(i, _)| i);
        &self.hash[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_commit() {
        let commit = RawCommit::new(
            "abc1234567890",
            "Add feature (#12)",
            "Author",
            "author@example.com",
            Utc::now(),
        )
        .with_body("\n");

        assert_eq!(commit.short_hash(), "abc1234");
        assert!(commit.body.is_none());
        assert_eq!(RawCommit::new("abc", "", "", "", Utc::now()).short_hash(), "abc");
    }
}
