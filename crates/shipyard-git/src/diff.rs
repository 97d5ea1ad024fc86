//! Tree comparison

use tracing::debug;

use crate::repository::{GitRepo, Result};

impl GitRepo {
    /// Whether two revisions point at identical trees
    pub fn trees_equal(&self, a: &str, b: &str) -> Result<bool> {
        let tree_a = self.resolve_commit(a)?.tree()?;
        let tree_b = self.resolve_commit(b)?.tree()?;

        if tree_a.id() == tree_b.id() {
            return Ok(true);
        }

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&tree_a), Some(&tree_b), None)?;
        let empty = diff.deltas().len() == 0;
        debug!(a, b, empty, "compared trees");
        Ok(empty)
    }
}
