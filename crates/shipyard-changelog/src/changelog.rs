//! Changelog resource

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use shipyard_core::error::ChangelogError;
use shipyard_core::types::BumpType;
use shipyard_core::version::{format_version, is_version_tag, next_tag};

/// Result type for changelog operations
pub type Result<T> = std::result::Result<T, ChangelogError>;

/// Storage for changelog text
pub trait ChangelogStore: Send + Sync {
    /// Current content; `None` when there is no changelog yet
    fn read(&self) -> Result<Option<String>>;

    /// Replace the whole content
    fn write(&self, content: &str) -> Result<()>;
}

/// Changelog stored in a file
#[derive(Debug, Clone)]
pub struct FileChangelog {
    path: PathBuf,
}

impl FileChangelog {
    /// Create a store for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the changelog file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_failed(&self, reason: impl ToString) -> ChangelogError {
        ChangelogError::WriteFailed {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

impl ChangelogStore for FileChangelog {
    fn read(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ChangelogError::ReadFailed {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Writes to a temporary file beside the target and renames it into
    /// place, so readers see either the old or the new content.
    #[instrument(skip(self, content), fields(path = %self.path.display(), bytes = content.len()))]
    fn write(&self, content: &str) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut file = NamedTempFile::new_in(&dir).map_err(|e| self.write_failed(e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| self.write_failed(e))?;
        file.persist(&self.path)
            .map_err(|e| self.write_failed(e.error))?;

        info!(path = %self.path.display(), "wrote changelog");
        Ok(())
    }
}

/// Changelog held in memory
#[derive(Debug, Default)]
pub struct MemoryChangelog {
    content: Mutex<Option<String>>,
}

impl MemoryChangelog {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding existing content
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Mutex::new(Some(content.into())),
        }
    }

    /// Current content
    pub fn content(&self) -> Option<String> {
        self.content.lock().ok().and_then(|c| c.clone())
    }
}

impl ChangelogStore for MemoryChangelog {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.content())
    }

    fn write(&self, content: &str) -> Result<()> {
        let mut guard = self.content.lock().map_err(|e| ChangelogError::WriteFailed {
            path: PathBuf::from("<memory>"),
            reason: e.to_string(),
        })?;
        *guard = Some(content.to_string());
        Ok(())
    }
}

/// Heading for a changelog entry: `# <version> (<date>)`.
///
/// The version is `current_tag` bumped one patch. When it equals
/// `previous_tag` or is not a semantic version the tag is used as written,
/// ignoring `no_version_prefix`.
pub fn release_heading(
    previous_tag: &str,
    current_tag: &str,
    no_version_prefix: bool,
    date: NaiveDate,
) -> String {
    let version = if current_tag == previous_tag || !is_version_tag(current_tag) {
        current_tag.to_string()
    } else {
        let bumped = next_tag(current_tag, BumpType::Patch).unwrap_or_else(|_| current_tag.to_string());
        format_version(&bumped, no_version_prefix)
    };

    debug!(previous_tag, current_tag, version = %version, "computed changelog heading");
    format!("# {} ({})", version, date.format("%Y-%m-%d"))
}

/// New changelog content: the entry, then a blank line, then the untouched
/// existing content
pub fn prepend_release(existing: Option<&str>, heading: &str, notes: &str) -> String {
    let entry = if notes.is_empty() {
        format!("{}\n", heading)
    } else {
        format!("{}\n\n{}\n", heading, notes)
    };

    match existing {
        Some(old) if !old.is_empty() => format!("{}\n{}", entry, old),
        _ => entry,
    }
}
