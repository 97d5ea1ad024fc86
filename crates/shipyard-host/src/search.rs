//! Pull request search queries
//!
//! Queries use the host's issue-search grammar: whitespace separated terms,
//! `key:value` qualifiers, quoted phrases and parenthesised `OR` groups.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use shipyard_core::types::Commit;

/// A query term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTerm {
    /// `key:value`
    Qualifier { key: String, value: String },
    /// Bare word or quoted phrase
    Text(String),
    /// Terms joined with `OR`
    AnyOf(Vec<QueryTerm>),
}

impl QueryTerm {
    /// Create a qualifier term
    pub fn qualifier(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Qualifier {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for QueryTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qualifier { key, value } => write!(f, "{}:{}", key, value),
            Self::Text(text) if text.contains(char::is_whitespace) => write!(f, "\"{}\"", text),
            Self::Text(text) => write!(f, "{}", text),
            Self::AnyOf(terms) => {
                let joined: Vec<String> = terms.iter().map(ToString::to_string).collect();
                write!(f, "({})", joined.join(" OR "))
            }
        }
    }
}

/// Error raised when a query does not follow the search grammar
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid search query at {position}: {message}")]
pub struct QueryParseError {
    /// Byte offset of the problem
    pub position: usize,
    /// What went wrong
    pub message: String,
}

/// Search for merged pull requests in one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    owner: String,
    repo: String,
    merged_since: DateTime<Utc>,
    merged_until: Option<DateTime<Utc>>,
    authors: Vec<String>,
}

impl SearchQuery {
    /// Query for pull requests merged since `merged_since`
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, merged_since: DateTime<Utc>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            merged_since,
            merged_until: None,
            authors: Vec::new(),
        }
    }

    /// Close the merge window
    pub fn merged_until(mut self, until: DateTime<Utc>) -> Self {
        self.merged_until = Some(until);
        self
    }

    /// Move the start of the merge window
    pub fn merged_since(mut self, since: DateTime<Utc>) -> Self {
        self.merged_since = since;
        self
    }

    /// Restrict to an author; duplicates are ignored
    pub fn author(mut self, author: impl Into<String>) -> Self {
        let author = author.into();
        if !author.is_empty() && !self.authors.iter().any(|a| a.eq_ignore_ascii_case(&author)) {
            self.authors.push(author);
        }
        self
    }

    /// Authors the query is restricted to
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// Terms making up the query
    pub fn terms(&self) -> Vec<QueryTerm> {
        let window = match self.merged_until {
            Some(until) => format!("{}..{}", timestamp(self.merged_since), timestamp(until)),
            None => format!(">={}", timestamp(self.merged_since)),
        };

        let mut terms = vec![
            QueryTerm::qualifier("repo", format!("{}/{}", self.owner, self.repo)),
            QueryTerm::qualifier("is", "pr"),
            QueryTerm::qualifier("is", "merged"),
            QueryTerm::qualifier("merged", window),
        ];

        let authors: Vec<QueryTerm> = self
            .authors
            .iter()
            .map(|a| QueryTerm::qualifier("author", a))
            .collect();

        match authors.len() {
            0 => {}
            1 => terms.extend(authors),
            _ => terms.push(QueryTerm::AnyOf(authors)),
        }

        terms
    }

    /// Parse a query string into terms, rejecting malformed input
    pub fn parse(input: &str) -> Result<Vec<QueryTerm>, QueryParseError> {
        let mut parser = Parser {
            input,
            pos: 0,
        };
        let terms = parser.terms(false)?;
        if terms.is_empty() {
            return Err(parser.error("empty query"));
        }
        Ok(terms)
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.terms().iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join(" "))
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Build the search for pull requests that may have produced `commits`.
///
/// The merge window spans the commits' authored dates and the author filter
/// lists each distinct identity, preferring platform logins over emails.
/// Returns `None` for an empty commit list.
pub fn build_search_query(owner: &str, repo: &str, commits: &[Commit]) -> Option<String> {
    let first = commits.iter().map(|c| c.authored_at).min()?;
    let last = commits.iter().map(|c| c.authored_at).max()?;

    let query = commits
        .iter()
        .flat_map(|c| &c.authors)
        .filter_map(|a| a.username.as_ref().or(a.email.as_ref()))
        .fold(SearchQuery::new(owner, repo, first).merged_until(last), |q, author| {
            q.author(author.as_str())
        });

    Some(query.to_string())
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, message: &str) -> QueryParseError {
        QueryParseError {
            position: self.pos,
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.pos += c.len_utf8();
        }
    }

    fn terms(&mut self, in_group: bool) -> Result<Vec<QueryTerm>, QueryParseError> {
        let mut terms = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                None if in_group => return Err(self.error("unclosed group")),
                None => return Ok(terms),
                Some(')') if in_group => return Ok(terms),
                Some(')') => return Err(self.error("unexpected ')'")),
                Some(_) => terms.push(self.term()?),
            }
        }
    }

    fn term(&mut self) -> Result<QueryTerm, QueryParseError> {
        match self.peek() {
            Some('(') => self.group(),
            Some('"') => self.quoted().map(QueryTerm::Text),
            _ => {
                let start = self.pos;
                let word = self.word();
                if word == "OR" {
                    self.pos = start;
                    return Err(self.error("OR outside of a group"));
                }
                match word.split_once(':') {
                    Some((key, value)) if !key.is_empty() && !value.is_empty() => {
                        Ok(QueryTerm::qualifier(key, value))
                    }
                    Some(_) => {
                        self.pos = start;
                        Err(self.error("qualifier needs a key and a value"))
                    }
                    None => Ok(QueryTerm::Text(word)),
                }
            }
        }
    }

    fn word(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek().filter(|c| !c.is_whitespace() && *c != '(' && *c != ')') {
            self.pos += c.len_utf8();
        }
        self.input[start..self.pos].to_string()
    }

    fn quoted(&mut self) -> Result<String, QueryParseError> {
        self.pos += 1;
        let start = self.pos;
        match self.input[start..].find('"') {
            Some(offset) => {
                self.pos = start + offset + 1;
                Ok(self.input[start..start + offset].to_string())
            }
            None => Err(self.error("unterminated quote")),
        }
    }

    fn group(&mut self) -> Result<QueryTerm, QueryParseError> {
        self.pos += 1;
        let mut alternatives = Vec::new();

        loop {
            self.skip_whitespace();
            if self.peek() == Some(')') {
                return Err(self.error("expected a term"));
            }
            alternatives.push(self.term()?);

            self.skip_whitespace();
            match self.peek() {
                Some(')') => {
                    self.pos += 1;
                    return Ok(QueryTerm::AnyOf(alternatives));
                }
                None => return Err(self.error("unclosed group")),
                Some(_) => {
                    if self.word() != "OR" {
                        return Err(self.error("expected OR"));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use shipyard_core::types::Author;

    fn commit(hash: &str, email: &str, seconds: i64) -> Commit {
        Commit::new(
            hash,
            "subject",
            "Name",
            email,
            Utc.timestamp_opt(seconds, 0).unwrap(),
        )
    }

    #[test]
    fn test_empty_commit_list_has_no_query() {
        assert_eq!(build_search_query("web", "site", &[]), None);
    }

    #[test]
    fn test_query_spans_authored_dates() {
        let mut first = commit("a", "adam@dierkens.com", 1_600_000_000);
        first.add_author(Author::from_username("adierkens"));
        let second = commit("b", "andrew@lisowski.com", 1_600_086_400);

        let query = build_search_query("web", "site", &[second, first]).unwrap();

        assert_eq!(
            query,
            "repo:web/site is:pr is:merged merged:2020-09-13T12:26:40Z..2020-09-14T12:26:40Z \
             (author:andrew@lisowski.com OR author:adam@dierkens.com OR author:adierkens)"
        );
        let terms = SearchQuery::parse(&query).unwrap();
        assert_eq!(terms.len(), 5);
        assert!(matches!(&terms[4], QueryTerm::AnyOf(alts) if alts.len() == 3));
    }

    #[test]
    fn test_single_author_is_not_grouped() {
        let commits = [
            commit("a", "adam@dierkens.com", 1_600_000_000),
            commit("b", "ADAM@dierkens.com", 1_600_000_100),
        ];

        let query = build_search_query("web", "site", &commits).unwrap();
        assert!(query.ends_with(" author:adam@dierkens.com"));
        assert!(SearchQuery::parse(&query).is_ok());
    }

    #[test]
    fn test_open_window() {
        let since = Utc.timestamp_opt(1_600_000_000, 0).unwrap();
        let query = SearchQuery::new("web", "site", since).to_string();
        assert_eq!(
            query,
            "repo:web/site is:pr is:merged merged:>=2020-09-13T12:26:40Z"
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(SearchQuery::parse("").is_err());
        assert!(SearchQuery::parse("repo:web/site (author:a OR").is_err());
        assert!(SearchQuery::parse("repo:web/site author:a)").is_err());
        assert!(SearchQuery::parse("a OR b").is_err());
        assert!(SearchQuery::parse("(a b)").is_err());
        assert!(SearchQuery::parse("is:").is_err());
        assert!(SearchQuery::parse("\"unterminated").is_err());
    }

    #[test]
    fn test_parse_quoted_text() {
        let terms = SearchQuery::parse("is:pr \"fix the build\"").unwrap();
        assert_eq!(terms[1], QueryTerm::Text("fix the build".to_string()));
        assert_eq!(terms[1].to_string(), "\"fix the build\"");
    }
}
