//! Shipyard Release - The release engine
//!
//! [`Release`] resolves a commit range into fully correlated commits, then
//! reduces them to a version bump, release notes or a changelog entry. It
//! also reconciles the repository's version labels.

mod authors;
mod cache;
mod context;
mod correlator;
pub mod labels;
mod release;
pub mod semver;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::Memo;
pub use context::ReleaseContext;
pub use labels::LabelSyncReport;
pub use release::Release;
pub use semver::calculate_semver_bump;
