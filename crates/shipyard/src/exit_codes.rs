//! Exit codes for the CLI

use shipyard_core::error::{ConfigError, GitError, HostError, ShipyardError};

/// Success
#[allow(dead_code)]
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Git error
pub const GIT_ERROR: i32 = 3;

/// Host error
pub const HOST_ERROR: i32 = 4;

/// Changelog write error
pub const CHANGELOG_ERROR: i32 = 5;

/// Exit code for an error returned by a command
pub fn for_error(error: &anyhow::Error) -> i32 {
    if let Some(e) = error.downcast_ref::<ShipyardError>() {
        return match e {
            ShipyardError::Config(_) => CONFIG_ERROR,
            ShipyardError::Git(_) => GIT_ERROR,
            ShipyardError::Host(_) => HOST_ERROR,
            ShipyardError::Changelog(_) => CHANGELOG_ERROR,
            _ => ERROR,
        };
    }

    if error.is::<ConfigError>() {
        CONFIG_ERROR
    } else if error.is::<GitError>() {
        GIT_ERROR
    } else if error.is::<HostError>() {
        HOST_ERROR
    } else {
        ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipyard_core::error::ChangelogError;

    #[test]
    fn test_exit_code_for_error() {
        let git = anyhow::Error::from(GitError::NoCommits);
        assert_eq!(for_error(&git), GIT_ERROR);

        let wrapped = anyhow::Error::from(ShipyardError::from(ChangelogError::WriteFailed {
            path: "CHANGELOG.md".into(),
            reason: "read-only".to_string(),
        }));
        assert_eq!(for_error(&wrapped), CHANGELOG_ERROR);

        let other = anyhow::anyhow!("boom");
        assert_eq!(for_error(&other), ERROR);
    }
}
