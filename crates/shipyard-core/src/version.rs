//! Tag and version arithmetic

use semver::Version;

use crate::error::VersionError;
use crate::types::BumpType;

/// Parse a tag such as `v1.2.3` or `1.2.3`
pub fn parse_tag(tag: &str) -> Result<Version, VersionError> {
    let version = tag.strip_prefix('v').unwrap_or(tag);
    Version::parse(version).map_err(|e| VersionError::ParseFailed(tag.to_string(), e.to_string()))
}

/// Check if a tag parses as a semantic version
pub fn is_version_tag(tag: &str) -> bool {
    parse_tag(tag).is_ok()
}

/// Apply a bump to a version
pub fn bump_version(current: &Version, bump: BumpType) -> Version {
    let mut next = current.clone();

    match bump {
        BumpType::Major => {
            next.major += 1;
            next.minor = 0;
            next.patch = 0;
        }
        BumpType::Minor => {
            next.minor += 1;
            next.patch = 0;
        }
        BumpType::Patch => {
            // A prerelease is promoted to its release rather than skipped past
            if next.pre.is_empty() {
                next.patch += 1;
            }
        }
    }

    next.pre = semver::Prerelease::EMPTY;
    next.build = semver::BuildMetadata::EMPTY;
    next
}

/// Bump a tag, keeping whether it carried a `v` prefix
pub fn next_tag(tag: &str, bump: BumpType) -> Result<String, VersionError> {
    let next = bump_version(&parse_tag(tag)?, bump);
    if tag.starts_with('v') {
        Ok(format!("v{}", next))
    } else {
        Ok(next.to_string())
    }
}

/// Render a version with or without the `v` prefix
pub fn format_version(version: &str, no_version_prefix: bool) -> String {
    let bare = version.strip_prefix('v').unwrap_or(version);
    if no_version_prefix {
        bare.to_string()
    } else {
        format!("v{}", bare)
    }
}
