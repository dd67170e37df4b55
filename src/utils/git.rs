//! Version-control reads for previous-state recovery.
//!
//! Two operations back the git-based previous-state source: reading a
//! committed file's content at a ref ("show file at ref"), and checking
//! whether a working-tree file is byte-identical to that ref's copy (the
//! `git diff --quiet` equivalent).

use anyhow::{Context, Result, anyhow};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// A committed baseline to compare the working tree against.
pub struct GitBaseline {
    repo: gix::Repository,
    spec: String,
    root: PathBuf,
}

impl GitBaseline {
    /// Open the repository at `root`, pinned to the given revision spec
    /// (e.g. `HEAD`, `origin/gh-pages`).
    pub fn open(root: &Path, spec: &str) -> Result<Self> {
        let repo = gix::open(root)
            .with_context(|| format!("Failed to open git repository at {}", root.display()))?;
        Ok(Self {
            repo,
            spec: spec.to_owned(),
            root: root.to_path_buf(),
        })
    }

    /// Read a committed file's content at the pinned ref.
    ///
    /// Returns `None` when the ref's tree has no entry at `path`.
    pub fn show_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let tree = self
            .repo
            .rev_parse_single(self.spec.as_str())
            .with_context(|| format!("Cannot resolve revision `{}`", self.spec))?
            .object()?
            .peel_to_tree()
            .with_context(|| format!("Revision `{}` has no tree", self.spec))?;

        let Some(entry) = tree.lookup_entry_by_path(path)? else {
            return Ok(None);
        };

        let object = entry.object()?;
        if object.kind != gix::object::Kind::Blob {
            return Err(anyhow!("`{path}` at `{}` is not a file", self.spec));
        }

        Ok(Some(object.detach().data))
    }

    /// Check whether the working-tree file at `path` is byte-identical to
    /// the committed copy at the pinned ref.
    ///
    /// A missing committed copy or an unreadable working-tree file both
    /// count as changed.
    pub fn file_unchanged(&self, path: &str) -> Result<bool> {
        let Some(committed) = self.show_file(path)? else {
            return Ok(false);
        };
        Ok(fs::read(self.root.join(path))
            .map(|current| current == committed)
            .unwrap_or(false))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_missing_repo() {
        let dir = TempDir::new().unwrap();
        let result = GitBaseline::open(dir.path(), "HEAD");
        assert!(result.is_err());
    }

    #[test]
    fn test_show_file_unresolvable_ref() {
        let dir = TempDir::new().unwrap();
        gix::init(dir.path()).unwrap();

        let baseline = GitBaseline::open(dir.path(), "refs/heads/nonexistent").unwrap();
        assert!(baseline.show_file("sitemap.xml").is_err());
    }

    #[test]
    fn test_file_unchanged_unresolvable_ref() {
        let dir = TempDir::new().unwrap();
        gix::init(dir.path()).unwrap();

        let baseline = GitBaseline::open(dir.path(), "HEAD").unwrap();
        // Fresh repo has no commits, so HEAD cannot resolve
        assert!(baseline.file_unchanged("anything.html").is_err());
    }
}
