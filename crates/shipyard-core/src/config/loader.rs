//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result};

use super::defaults::config_file_names;
use super::types::Config;
use super::validation::validate_config;

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<Config> {
    let format = if path.extension().is_some_and(|e| e == "toml") {
        "TOML"
    } else {
        "YAML"
    };
    info!(path = %path.display(), format, "loading config");

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

    let config: Config = if format == "TOML" {
        toml::from_str(&content).map_err(ConfigError::TomlError)?
    } else {
        serde_yaml::from_str(&content).map_err(ConfigError::YamlError)?
    };

    validate_config(&config)?;
    debug!(path = %path.display(), "config loaded and validated");
    Ok(config)
}

/// Find configuration file in directory or parent directories.
///
/// Each level checks `<dir>/<name>` before `<dir>/.github/<name>`; the
/// first match wins.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");
    let mut current = start_dir.to_path_buf();

    loop {
        for name in config_file_names() {
            let config_path = current.join(name);
            if config_path.exists() {
                info!(path = %config_path.display(), "found config file");
                return Some(config_path);
            }

            let github_path = current.join(".github").join(name);
            if github_path.exists() {
                info!(path = %github_path.display(), "found config file in .github/");
                return Some(github_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    debug!("no config file found");
    None
}

/// Load configuration from directory (searching parent directories)
pub fn load_config_from_dir(dir: &Path) -> Result<(Config, PathBuf)> {
    let config_path = find_config(dir).ok_or_else(|| ConfigError::NotFound(dir.to_path_buf()))?;

    let config = load_config(&config_path)?;
    Ok((config, config_path))
}

/// Load configuration or use defaults when none is found.
///
/// A config file that exists but fails to parse or validate is still an
/// error.
pub fn load_config_or_default(dir: &Path) -> Result<(Config, Option<PathBuf>)> {
    match find_config(dir) {
        Some(path) => Ok((load_config(&path)?, Some(path))),
        None => {
            warn!(dir = %dir.display(), "no config found, using defaults");
            Ok((Config::default(), None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::ReleaseType;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("shipyard.yaml");
        std::fs::write(&config_path, "release:\n  concurrency: 4\n").unwrap();

        assert_eq!(find_config(temp.path()), Some(config_path));
    }

    #[test]
    fn test_find_config_in_github_dir() {
        let temp = TempDir::new().unwrap();
        let github_dir = temp.path().join(".github");
        std::fs::create_dir_all(&github_dir).unwrap();
        let config_path = github_dir.join("shipyard.toml");
        std::fs::write(&config_path, "[release]\nconcurrency = 4\n").unwrap();

        assert_eq!(find_config(temp.path()), Some(config_path));
    }

    #[test]
    fn test_find_config_walks_parents() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        let config_path = temp.path().join(".shipyard.yaml");
        std::fs::write(&config_path, "{}\n").unwrap();

        assert_eq!(find_config(&nested), Some(config_path));
    }

    #[test]
    fn test_load_config_yaml_labels() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("shipyard.yaml");
        std::fs::write(
            &config_path,
            r#"
repository:
  owner: web
  repo: site
release:
  only_publish_with_release_label: true
  labels:
    - name: "Version: Major"
      releaseType: major
    - name: deploy
      releaseType: release
"#,
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.repository.owner.as_deref(), Some("web"));
        assert!(config.release.only_publish_with_release_label);

        let map = config.release.version_map();
        assert_eq!(map[&ReleaseType::Major], ["major", "Version: Major"]);
        assert_eq!(map[&ReleaseType::Release], ["release", "deploy"]);
        assert_eq!(config.release.concurrency, 8);
    }

    #[test]
    fn test_load_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("shipyard.toml");
        std::fs::write(
            &config_path,
            "[release]\nno_version_prefix = true\n\n[changelog]\nfile = \"HISTORY.md\"\n",
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert!(config.release.no_version_prefix);
        assert_eq!(config.changelog.file, PathBuf::from("HISTORY.md"));
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("shipyard.yaml");
        std::fs::write(&config_path, "release:\n  concurrency: 0\n").unwrap();

        assert!(load_config(&config_path).is_err());
        assert!(load_config_or_default(temp.path()).is_err());
    }

    #[test]
    fn test_load_or_default_without_file() {
        let temp = TempDir::new().unwrap();
        let (config, path) = load_config_or_default(temp.path()).unwrap();
        // A parent of the temp dir could hold a config; only assert when none was found
        if path.is_none() {
            assert_eq!(config.release.base_branch, "main");
        }
    }
}
