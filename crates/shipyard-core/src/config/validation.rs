//! Configuration validation

use std::collections::HashSet;

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_labels(config)?;
    validate_release(config)?;
    validate_changelog(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

fn validate_labels(config: &Config) -> Result<()> {
    let mut seen = HashSet::new();

    for label in &config.release.labels {
        if label.name.trim().is_empty() {
            return Err(invalid("release.labels", "label name cannot be empty").into());
        }

        if !seen.insert(label.name.to_lowercase()) {
            return Err(invalid(
                "release.labels",
                format!("duplicate label '{}'", label.name),
            )
            .into());
        }

        if let Some(color) = &label.color {
            let valid = color.len() == 6 && color.chars().all(|c| c.is_ascii_hexdigit());
            if !valid {
                return Err(invalid(
                    "release.labels",
                    format!("label '{}' has invalid color '{}'", label.name, color),
                )
                .into());
            }
        }
    }

    Ok(())
}

fn validate_release(config: &Config) -> Result<()> {
    let release = &config.release;

    if release.concurrency == 0 {
        return Err(invalid("release.concurrency", "must be at least 1").into());
    }

    if release.base_branch.is_empty() {
        return Err(invalid("release.base_branch", "branch cannot be empty").into());
    }

    if release.other_heading.trim().is_empty() {
        return Err(invalid("release.other_heading", "heading cannot be empty").into());
    }

    for section in &release.sections {
        if section.keyword.is_empty() || section.title.trim().is_empty() {
            return Err(invalid(
                "release.sections",
                "sections need both a keyword and a title",
            )
            .into());
        }
    }

    Ok(())
}

fn validate_changelog(config: &Config) -> Result<()> {
    if config.changelog.file.as_os_str().is_empty() {
        return Err(invalid("changelog.file", "path cannot be empty").into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{LabelDefinition, ReleaseType};

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let mut config = Config::default();
        config
            .release
            .labels
            .push(LabelDefinition::new("MAJOR", "", ReleaseType::Major));

        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_bad_color_rejected() {
        let mut config = Config::default();
        config.release.labels =
            vec![LabelDefinition::new("deploy", "", ReleaseType::Release).with_color("#fff")];

        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_heading_rejected() {
        let mut config = Config::default();
        config.release.other_heading = "  ".to_string();

        assert!(validate_config(&config).is_err());
    }
}
