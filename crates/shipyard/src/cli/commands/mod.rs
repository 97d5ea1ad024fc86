//! CLI commands

mod changelog;
mod labels;
mod release_notes;
mod version;

pub use changelog::ChangelogCommand;
pub use labels::LabelsCommand;
pub use release_notes::ReleaseNotesCommand;
pub use version::VersionCommand;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tracing::debug;

use shipyard_changelog::ChangelogStore;
use shipyard_core::config::{load_config_or_default, Config};
use shipyard_git::GitRepo;
use shipyard_host::{GitHubClient, GitHubConfig, HostClient};
use shipyard_release::Release;

/// Commit range shared by the commands
#[derive(Debug, Clone, Args)]
pub struct RangeArgs {
    /// Start of the range (defaults to the latest version tag)
    #[arg(long)]
    pub from: Option<String>,

    /// End of the range
    #[arg(long, default_value = "HEAD")]
    pub to: String,
}

/// Configuration and repository for the working directory
pub(crate) struct Project {
    pub config: Config,
    pub repo: GitRepo,
}

impl Project {
    /// Load the configuration and open the enclosing repository
    pub fn open() -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()?;
        let repo = GitRepo::discover(&cwd)?;
        let (config, path) = load_config_or_default(repo.path())?;
        debug!(config = ?path, "loaded configuration");

        Ok(Self { config, repo })
    }

    /// Start of the range; the latest version tag unless given
    pub fn from_ref(&self, range: &RangeArgs) -> anyhow::Result<Option<String>> {
        match &range.from {
            Some(from) => Ok(Some(from.clone())),
            None => Ok(self.repo.latest_version_tag()?),
        }
    }

    /// Changelog file in the repository
    pub fn changelog_path(&self) -> PathBuf {
        self.repo.path().join(&self.config.changelog.file)
    }

    /// Host client for the configured repository, falling back to the
    /// `origin` remote for the coordinates
    pub fn host(&self) -> anyhow::Result<Arc<dyn HostClient>> {
        let repository = &self.config.repository;
        let (owner, repo) = match (&repository.owner, &repository.repo) {
            (Some(owner), Some(repo)) => (owner.clone(), repo.clone()),
            (owner, repo) => {
                let slug = self.repo.remote_slug("origin")?;
                (
                    owner.clone().unwrap_or(slug.owner),
                    repo.clone().unwrap_or(slug.repo),
                )
            }
        };

        let config = GitHubConfig::new(owner, repo)
            .with_urls(&repository.api_url, &repository.web_url)
            .with_env_token();
        Ok(Arc::new(GitHubClient::new(config)?))
    }

    /// Release engine over this project
    pub fn into_release(self, changelog: impl ChangelogStore + 'static) -> anyhow::Result<Release> {
        let host = self.host()?;
        Ok(Release::new(self.repo, host, changelog, self.config.release))
    }
}
