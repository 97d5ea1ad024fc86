//! Git repository operations

use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::{info, instrument};

use shipyard_core::error::GitError;

/// Result type for git operations
pub type Result<T> = std::result::Result<T, GitError>;

/// Git repository wrapper
pub struct GitRepo {
    pub(crate) repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository at the given path
    #[instrument(fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "opening git repository");
        let repo = Repository::open(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                GitError::RepositoryNotFound(path.to_path_buf())
            } else {
                GitError::OpenFailed(e.to_string())
            }
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            repo,
        })
    }

    /// Discover and open a repository by searching parent directories
    #[instrument(fields(start_path = %start_path.display()))]
    pub fn discover(start_path: &Path) -> Result<Self> {
        info!(start_path = %start_path.display(), "discovering git repository");
        let repo = Repository::discover(start_path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                GitError::NotARepository(start_path.to_path_buf())
            } else {
                GitError::OpenFailed(e.to_string())
            }
        })?;

        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, path })
    }

    /// Get the repository path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a revision (hash, tag, branch, `HEAD`) to a commit
    pub fn resolve_commit(&self, rev: &str) -> Result<git2::Commit<'_>> {
        self.repo
            .revparse_single(rev)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|e| match e.code() {
                git2::ErrorCode::NotFound | git2::ErrorCode::InvalidSpec => {
                    GitError::UnknownRevision(rev.to_string())
                }
                _ => GitError::Git2(e),
            })
    }

    /// Get the HEAD commit
    pub fn head_commit(&self) -> Result<git2::Commit<'_>> {
        let head = self.repo.head().map_err(|e| match e.code() {
            git2::ErrorCode::UnbornBranch => GitError::NoCommits,
            _ => GitError::Git2(e),
        })?;
        head.peel_to_commit().map_err(GitError::Git2)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use git2::{Oid, Repository, Signature, Time};
    use std::path::Path;
    use tempfile::TempDir;

    /// Scratch repository with helpers for writing commits
    pub struct Scratch {
        pub temp: TempDir,
        pub repo: Repository,
    }

    impl Scratch {
        pub fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let repo = Repository::init(temp.path()).unwrap();
            Self { temp, repo }
        }

        /// Write files and commit them on HEAD at the given unix time
        pub fn commit(&self, files: &[(&str, &str)], message: &str, seconds: i64) -> Oid {
            for (path, content) in files {
                let full = self.temp.path().join(path);
                if let Some(parent) = full.parent() {
                    std::fs::create_dir_all(parent).unwrap();
                }
                std::fs::write(full, content).unwrap();
            }

            let mut index = self.repo.index().unwrap();
            for (path, _) in files {
                index.add_path(Path::new(path)).unwrap();
            }
            index.write().unwrap();

            let tree_id = index.write_tree().unwrap();
            let tree = self.repo.find_tree(tree_id).unwrap();
            let sig = Signature::new("Adam Dierkens", "adam@dierkens.com", &Time::new(seconds, 0))
                .unwrap();

            let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
            let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

            self.repo
                .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
                .unwrap()
        }

        pub fn tag(&self, name: &str, oid: Oid) {
            let commit = self.repo.find_commit(oid).unwrap();
            self.repo
                .tag_lightweight(name, commit.as_object(), false)
                .unwrap();
        }
    }
}
