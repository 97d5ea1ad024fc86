//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::labels::{default_labels, get_version_map, LabelDefinition, VersionLabelMap};

/// Main configuration for Shipyard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote repository coordinates
    pub repository: RepositoryConfig,

    /// Release computation options
    pub release: ReleaseOptions,

    /// Changelog configuration
    pub changelog: ChangelogConfig,
}

/// Remote repository coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Repository owner; discovered from the `origin` remote when unset
    pub owner: Option<String>,

    /// Repository name; discovered from the `origin` remote when unset
    pub repo: Option<String>,

    /// REST API base URL
    pub api_url: String,

    /// Web base URL used for links
    pub web_url: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            owner: None,
            repo: None,
            api_url: "https://api.github.com".to_string(),
            web_url: "https://github.com".to_string(),
        }
    }
}

/// Options controlling bump computation and note rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseOptions {
    /// Label definitions; extend the built-in set
    pub labels: Vec<LabelDefinition>,

    /// Only release when a change carries a `release` label
    pub only_publish_with_release_label: bool,

    /// Render versions without the `v` prefix
    pub no_version_prefix: bool,

    /// Branch releases are cut from
    pub base_branch: String,

    /// Branches that produce prereleases
    pub prerelease_branches: Vec<String>,

    /// Release note sections, in render order
    pub sections: Vec<SectionHeading>,

    /// Heading for changes that fit no configured section
    pub other_heading: String,

    /// Maximum concurrent remote lookups
    pub concurrency: usize,
}

impl Default for ReleaseOptions {
    fn default() -> Self {
        Self {
            labels: default_labels(),
            only_publish_with_release_label: false,
            no_version_prefix: false,
            base_branch: "main".to_string(),
            prerelease_branches: vec!["next".to_string()],
            sections: vec![
                SectionHeading::new("major", "Breaking Changes"),
                SectionHeading::new("minor", "Features"),
                SectionHeading::new("patch", "Fixes"),
            ],
            other_heading: "Other".to_string(),
            concurrency: 8,
        }
    }
}

impl ReleaseOptions {
    /// Label-to-keyword map for these options
    pub fn version_map(&self) -> VersionLabelMap {
        get_version_map(&self.labels)
    }

    /// Built-in labels merged with configured ones; a configured label
    /// replaces the built-in label of the same name
    pub fn label_definitions(&self) -> Vec<LabelDefinition> {
        let mut merged = default_labels();
        for label in &self.labels {
            match merged.iter_mut().find(|l| l.name == label.name) {
                Some(existing) => *existing = label.clone(),
                None => merged.push(label.clone()),
            }
        }
        merged
    }

    /// Heading for a section keyword
    pub fn heading_for(&self, keyword: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.keyword == keyword)
            .map(|s| s.title.as_str())
    }
}

/// A release note section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionHeading {
    /// Release keyword grouped under this heading
    pub keyword: String,
    /// Rendered heading
    pub title: String,
}

impl SectionHeading {
    /// Create a section heading
    pub fn new(keyword: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            title: title.into(),
        }
    }
}

/// Changelog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Changelog file path
    pub file: PathBuf,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("CHANGELOG.md"),
        }
    }
}
