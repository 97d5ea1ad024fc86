//! Tag operations

use semver::Version;
use tracing::{debug, instrument};

use crate::repository::{GitRepo, Result};
use shipyard_core::version::parse_tag;

impl GitRepo {
    /// All tag names
    pub fn tag_names(&self) -> Result<Vec<String>> {
        let names = self.repo.tag_names(None)?;
        Ok(names.iter().flatten().map(str::to_string).collect())
    }

    /// Tags that parse as semantic versions, highest first
    pub fn version_tags(&self) -> Result<Vec<(String, Version)>> {
        let mut tags: Vec<_> = self
            .tag_names()?
            .into_iter()
            .filter_map(|name| parse_tag(&name).ok().map(|v| (name, v)))
            .collect();

        tags.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(tags)
    }

    /// Find the latest tag by semantic version
    #[instrument(skip(self))]
    pub fn latest_version_tag(&self) -> Result<Option<String>> {
        let latest = self.version_tags()?.into_iter().next().map(|(name, _)| name);
        debug!(latest = ?latest, "found latest tag");
        Ok(latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::Scratch;

    #[test]
    fn test_latest_version_tag() {
        let scratch = Scratch::new();
        let first = scratch.commit(&[("a.txt", "a")], "first", 1_600_000_000);
        scratch.tag("v1.2.0", first);
        scratch.tag("v1.10.0", first);
        scratch.tag("nightly", first);
        scratch.tag("v1.10.0-next.1", first);

        let repo = GitRepo::open(scratch.temp.path()).unwrap();
        assert_eq!(repo.latest_version_tag().unwrap().as_deref(), Some("v1.10.0"));
        assert_eq!(repo.version_tags().unwrap().len(), 3);
    }

    #[test]
    fn test_no_tags() {
        let scratch = Scratch::new();
        scratch.commit(&[("a.txt", "a")], "first", 1_600_000_000);

        let repo = GitRepo::open(scratch.temp.path()).unwrap();
        assert_eq!(repo.latest_version_tag().unwrap(), None);
    }
}
