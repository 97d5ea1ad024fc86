//! Default configuration values

use super::types::Config;

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "shipyard.yaml";

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "shipyard.toml";

/// Alternative configuration file name
pub const ALT_CONFIG_FILE: &str = ".shipyard.yaml";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_YAML,
        DEFAULT_CONFIG_TOML,
        ALT_CONFIG_FILE,
        ".shipyard.toml",
    ]
}

/// Generate default configuration YAML
pub fn default_config_yaml() -> String {
    let config = Config::default();
    serde_yaml::to_string(&config).unwrap_or_else(|_| DEFAULT_CONFIG_TEMPLATE.to_string())
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Shipyard Configuration

repository:
  api_url: https://api.github.com
  web_url: https://github.com

release:
  only_publish_with_release_label: false
  no_version_prefix: false
  base_branch: main
  prerelease_branches: [next]
  other_heading: Other
  concurrency: 8
  sections:
    - keyword: major
      title: Breaking Changes
    - keyword: minor
      title: Features
    - keyword: patch
      title: Fixes
  labels:
    - name: major
      description: Increment the major version when merged
      releaseType: major
    - name: minor
      description: Increment the minor version when merged
      releaseType: minor
    - name: patch
      description: Increment the patch version when merged
      releaseType: patch
    - name: skip-release
      description: Preserve the current version when merged
      releaseType: skip
    - name: release
      description: Create a release when this pr is merged
      releaseType: release
    - name: internal
      description: Changes only affect the internal API
      releaseType: none
    - name: documentation
      description: Changes only affect the documentation
      releaseType: none

changelog:
  file: CHANGELOG.md
"#;
