//! Version labels and the label-to-bump mapping

use serde::{Deserialize, Serialize};

use crate::types::BumpType;

/// Release meaning of a label
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReleaseType {
    /// Triggers a major bump
    Major,
    /// Triggers a minor bump
    Minor,
    /// Triggers a patch bump
    Patch,
    /// Excludes the change from the bump
    Skip,
    /// Marks the change as releasable
    Release,
    /// Change carries no release meaning
    None,
    /// User-defined keyword
    Custom(String),
}

impl ReleaseType {
    /// Keyword for this release type
    pub fn as_str(&self) -> &str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::Skip => "skip",
            Self::Release => "release",
            Self::None => "none",
            Self::Custom(keyword) => keyword,
        }
    }

    /// Version bump this type implies, if any
    pub fn bump(&self) -> Option<BumpType> {
        match self {
            Self::Major => Some(BumpType::Major),
            Self::Minor => Some(BumpType::Minor),
            Self::Patch => Some(BumpType::Patch),
            _ => None,
        }
    }

    /// Default label color for this type
    pub fn default_color(&self) -> &'static str {
        match self {
            Self::Major => "C5000B",
            Self::Minor => "F1A60E",
            Self::Patch => "870048",
            Self::Skip => "BDBDBD",
            Self::Release => "007F70",
            Self::None | Self::Custom(_) => "696969",
        }
    }
}

impl From<String> for ReleaseType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "major" => Self::Major,
            "minor" => Self::Minor,
            "patch" => Self::Patch,
            "skip" => Self::Skip,
            "release" => Self::Release,
            "none" => Self::None,
            _ => Self::Custom(s),
        }
    }
}

impl From<&str> for ReleaseType {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<ReleaseType> for String {
    fn from(t: ReleaseType) -> Self {
        t.as_str().to_string()
    }
}

impl From<BumpType> for ReleaseType {
    fn from(bump: BumpType) -> Self {
        match bump {
            BumpType::Major => Self::Major,
            BumpType::Minor => Self::Minor,
            BumpType::Patch => Self::Patch,
        }
    }
}

impl std::fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A repository label and the release meaning attached to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelDefinition {
    /// Label name as it appears on the host
    pub name: String,
    /// Human description
    #[serde(default)]
    pub description: String,
    /// Release meaning
    #[serde(rename = "releaseType", alias = "release_type")]
    pub release_type: ReleaseType,
    /// Hex color without `#`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl LabelDefinition {
    /// Create a label definition
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        release_type: impl Into<ReleaseType>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            release_type: release_type.into(),
            color: None,
        }
    }

    /// Set the color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Configured color, or the release type's default
    pub fn color(&self) -> &str {
        self.color
            .as_deref()
            .unwrap_or_else(|| self.release_type.default_color())
    }
}

/// The built-in label set
pub fn default_labels() -> Vec<LabelDefinition> {
    vec![
        LabelDefinition::new(
            "major",
            "Increment the major version when merged",
            ReleaseType::Major,
        ),
        LabelDefinition::new(
            "minor",
            "Increment the minor version when merged",
            ReleaseType::Minor,
        ),
        LabelDefinition::new(
            "patch",
            "Increment the patch version when merged",
            ReleaseType::Patch,
        ),
        LabelDefinition::new(
            "skip-release",
            "Preserve the current version when merged",
            ReleaseType::Skip,
        ),
        LabelDefinition::new(
            "release",
            "Create a release when this pr is merged",
            ReleaseType::Release,
        ),
        LabelDefinition::new(
            "internal",
            "Changes only affect the internal API",
            ReleaseType::None,
        ),
        LabelDefinition::new(
            "documentation",
            "Changes only affect the documentation",
            ReleaseType::None,
        ),
    ]
}

/// Ordered mapping from release keyword to the label names that trigger it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionLabelMap {
    entries: Vec<(ReleaseType, Vec<String>)>,
}

impl VersionLabelMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map containing exactly the given labels, grouped by type in
    /// first-seen order
    pub fn from_labels(labels: &[LabelDefinition]) -> Self {
        let mut map = Self::new();
        for label in labels {
            map.append(label.release_type.clone(), &label.name);
        }
        map
    }

    /// Append a label name to the set for a release type
    pub fn append(&mut self, release_type: ReleaseType, name: &str) {
        match self.entries.iter_mut().find(|(t, _)| *t == release_type) {
            Some((_, names)) => {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
            None => self.entries.push((release_type, vec![name.to_string()])),
        }
    }

    /// Label names for a release type
    pub fn get(&self, release_type: &ReleaseType) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(t, _)| t == release_type)
            .map(|(_, names)| names.as_slice())
    }

    /// Iterate over entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&ReleaseType, &[String])> {
        self.entries.iter().map(|(t, names)| (t, names.as_slice()))
    }

    /// Release types a label maps to. Unrecognised labels map to nothing.
    pub fn release_types_for<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a ReleaseType> {
        self.entries
            .iter()
            .filter(move |(_, names)| names.iter().any(|n| n == label))
            .map(|(t, _)| t)
    }

    /// Whether any of the labels maps to the given release type
    pub fn matches(&self, labels: &[String], release_type: &ReleaseType) -> bool {
        self.get(release_type)
            .is_some_and(|names| labels.iter().any(|l| names.contains(l)))
    }

    /// Highest bump implied by a set of labels
    pub fn bump_for(&self, labels: &[String]) -> Option<BumpType> {
        labels
            .iter()
            .flat_map(|label| self.release_types_for(label))
            .filter_map(ReleaseType::bump)
            .max()
    }

    /// Release types recognised among the labels, deduplicated in map order
    pub fn recognised(&self, labels: &[String]) -> Vec<&ReleaseType> {
        self.entries
            .iter()
            .filter(|(_, names)| labels.iter().any(|l| names.contains(l)))
            .map(|(t, _)| t)
            .collect()
    }
}

impl std::ops::Index<&ReleaseType> for VersionLabelMap {
    type Output = [String];

    fn index(&self, release_type: &ReleaseType) -> &Self::Output {
        self.get(release_type).unwrap_or(&[])
    }
}

/// Build the version map: the built-in map extended with custom labels.
///
/// Custom labels are appended to the set of their release type; they never
/// replace a built-in entry.
pub fn get_version_map(custom: &[LabelDefinition]) -> VersionLabelMap {
    let mut map = VersionLabelMap::from_labels(&default_labels());
    for label in custom {
        map.append(label.release_type.clone(), &label.name);
    }
    map
}
