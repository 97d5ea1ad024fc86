//! Shipyard Changelog - Commit normalization and release note output
//!
//! This crate turns raw log records into [`Commit`](shipyard_core::Commit)s,
//! renders grouped release notes and maintains the changelog file.

pub mod changelog;
pub mod parser;
pub mod release_notes;

pub use changelog::{
    prepend_release, release_heading, ChangelogStore, FileChangelog, MemoryChangelog,
};
pub use parser::LogParse;
pub use release_notes::ReleaseNotesRenderer;
