//! Shipyard Host - Remote repository host access
//!
//! The release engine talks to the hosting platform only through the
//! [`HostClient`] trait. [`GitHubClient`] implements it over the GitHub
//! REST API; tests implement it with in-memory fixtures.

mod github;
pub mod search;
mod traits;
pub mod types;

pub use github::{GitHubClient, GitHubConfig};
pub use search::{build_search_query, QueryParseError, QueryTerm, SearchQuery};
pub use traits::{HostClient, Result};
pub use types::{
    CommitDetail, LatestRelease, PullRequest, PullRequestCommit, RemoteLabel, SearchItem,
    SearchResult, User,
};
