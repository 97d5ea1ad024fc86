//! Author resolution
//!
//! A git author becomes a platform identity through the owning pull
//! request's commit list (matched by email) or, failing that, through the
//! host's record of the commit. Lookups go through [`ReleaseContext`], so a
//! login or pull request is fetched at most once per invocation.

use tracing::debug;

use shipyard_core::types::{Author, Commit};
use shipyard_host::{HostClient, PullRequestCommit};

use crate::context::ReleaseContext;

/// Login the pull request commit list records for an email
fn login_for_email<'a>(pr_commits: &'a [PullRequestCommit], email: &str) -> Option<&'a str> {
    pr_commits
        .iter()
        .filter(|c| {
            c.author_email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(email))
        })
        .find_map(|c| c.author_login.as_deref())
        .filter(|login| !login.is_empty())
}

/// Attach platform identities to a commit's authors.
///
/// Remote failures leave an author with its git name and email.
pub(crate) async fn resolve_authors(ctx: &ReleaseContext, host: &dyn HostClient, commit: &mut Commit) {
    let pr_commits = match commit.pr_number() {
        Some(number) => ctx.pull_request_commits(host, number).await,
        None => Vec::new(),
    };

    let mut resolved = Vec::with_capacity(commit.authors.len());
    for (index, author) in commit.authors.iter().enumerate() {
        let mut login = author
            .email
            .as_deref()
            .and_then(|email| login_for_email(&pr_commits, email))
            .map(str::to_string);

        // The commit detail only identifies the primary author
        if login.is_none() && index == 0 && author.username.is_none() {
            login = ctx.commit_author(host, &commit.hash).await;
        }

        resolved.push(match login {
            Some(login) => with_profile(ctx, host, author.clone(), &login).await,
            None => author.clone(),
        });
    }
    commit.authors = resolved;

    if !commit.has_resolved_author() {
        let submitter = commit
            .pull_request
            .as_ref()
            .and_then(|pr| pr.submitter.clone());
        if let Some(submitter) = submitter {
            debug!(hash = %commit.hash, submitter = %submitter, "crediting pull request submitter");
            let author = with_profile(ctx, host, Author::default(), &submitter).await;
            let author = Author {
                username: Some(submitter),
                ..author
            };
            commit.add_author(author);
        }
    }
}

/// Fill in an author from a user profile; without one the author is
/// returned unchanged
async fn with_profile(ctx: &ReleaseContext, host: &dyn HostClient, author: Author, login: &str) -> Author {
    match ctx.user(host, login).await {
        Some(user) => Author {
            username: Some(user.login),
            name: user.name.or(author.name),
            email: author.email.or(user.email),
        },
        None => author,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at, MockHost};
    use shipyard_core::types::PullRequestRef;

    fn commit() -> Commit {
        Commit::new("1a2b", "Fix things", "Adam Dierkens", "adam@dierkens.com", at(1_600_000_000))
    }

    fn with_pr(number: u64, submitter: Option<&str>) -> Commit {
        commit().with_pull_request(PullRequestRef {
            number,
            merge_commit_sha: None,
            submitter: submitter.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_resolves_through_pull_request_commits() {
        let host = MockHost::new()
            .with_pull_request_commits(
                123,
                vec![PullRequestCommit::new("ffff").with_author("adierkens", "Adam@Dierkens.com")],
            )
            .with_user("adierkens", "Adam Dierkens");
        let ctx = ReleaseContext::new();
        let mut commit = with_pr(123, None);

        resolve_authors(&ctx, &host, &mut commit).await;

        assert_eq!(commit.authors[0].username.as_deref(), Some("adierkens"));
        assert_eq!(commit.authors[0].email.as_deref(), Some("adam@dierkens.com"));
        assert_eq!(host.count("get_commit_detail:"), 0);
    }

    #[tokio::test]
    async fn test_falls_back_to_commit_detail() {
        let host = MockHost::new()
            .with_commit_author("1a2b", "adierkens")
            .with_user("adierkens", "Adam Dierkens");
        let ctx = ReleaseContext::new();
        let mut commit = commit();

        resolve_authors(&ctx, &host, &mut commit).await;

        assert_eq!(commit.authors[0].username.as_deref(), Some("adierkens"));
    }

    #[tokio::test]
    async fn test_unknown_user_keeps_git_identity() {
        let host = MockHost::new().with_commit_author("1a2b", "ghost");
        let ctx = ReleaseContext::new();
        let mut commit = commit();

        resolve_authors(&ctx, &host, &mut commit).await;

        assert_eq!(commit.authors, vec![Author::from_git("Adam Dierkens", "adam@dierkens.com")]);
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_git_identity() {
        let host = MockHost::unreachable();
        let ctx = ReleaseContext::new();
        let mut commit = with_pr(123, None);

        resolve_authors(&ctx, &host, &mut commit).await;

        assert_eq!(commit.authors[0].display().as_deref(), Some("Adam Dierkens"));
    }

    #[tokio::test]
    async fn test_submitter_credited_when_unresolved() {
        let host = MockHost::new().with_user("andrew", "Andrew Lisowski");
        let ctx = ReleaseContext::new();
        let mut commit = with_pr(124, Some("andrew"));

        resolve_authors(&ctx, &host, &mut commit).await;

        assert_eq!(commit.authors.len(), 2);
        assert_eq!(commit.authors[1].username.as_deref(), Some("andrew"));
        assert_eq!(commit.authors[1].name.as_deref(), Some("Andrew Lisowski"));
    }

    #[tokio::test]
    async fn test_user_lookups_are_cached() {
        let host = MockHost::new()
            .with_commit_author("1a2b", "adierkens")
            .with_user("adierkens", "Adam Dierkens");
        let ctx = ReleaseContext::new();

        for _ in 0..3 {
            let mut commit = commit();
            resolve_authors(&ctx, &host, &mut commit).await;
        }

        assert_eq!(host.count("get_user_by_username:"), 1);
        assert_eq!(host.count("get_commit_detail:"), 1);
    }
}
