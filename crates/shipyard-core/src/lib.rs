//! Shipyard Core - Core library for label-driven release automation
//!
//! This crate provides the foundational types, error handling, configuration,
//! label/version mapping and hook primitives shared by the Shipyard crates.

pub mod config;
pub mod error;
pub mod hooks;
pub mod labels;
pub mod types;
pub mod version;

pub use config::{ChangelogConfig, Config, ReleaseOptions, RepositoryConfig, SectionHeading};
pub use error::{ChangelogError, ConfigError, GitError, HostError, Result, ShipyardError};
pub use hooks::{BailHook, SyncHook, WaterfallHook};
pub use labels::{default_labels, get_version_map, LabelDefinition, ReleaseType, VersionLabelMap};
pub use types::{Author, BumpType, Commit, PullRequestRef};
