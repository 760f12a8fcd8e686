//! Include/exclude path filtering with gitignore-style globs.

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::{Error, Result};

/// Compiled include/exclude policy for one watch root.
///
/// A path qualifies when it lies under the root, matches at least one
/// include pattern, and neither it nor any of its parent directories
/// matches an exclude pattern.
#[derive(Debug, Clone)]
pub struct PathFilter {
    root: PathBuf,
    include: Gitignore,
    exclude: Gitignore,
}

impl PathFilter {
    /// Compile a filter rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first malformed pattern.
    pub fn new(root: impl AsRef<Path>, include: &[String], exclude: &[String]) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        Ok(Self {
            include: compile(&root, include)?,
            exclude: compile(&root, exclude)?,
            root,
        })
    }

    /// Root that patterns are anchored to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check whether a change at `path` should count toward a restart.
    #[must_use]
    pub fn qualifies(&self, path: &Path) -> bool {
        let Some(relative) = self.relative(path) else {
            return false;
        };
        if relative.as_os_str().is_empty() {
            return false;
        }

        if self.is_excluded(relative) {
            return false;
        }

        self.include.matched(relative, false).is_ignore()
    }

    /// Check a root-relative path against the exclude set, parents included.
    #[must_use]
    pub fn is_excluded(&self, relative: &Path) -> bool {
        self.exclude
            .matched_path_or_any_parents(relative, false)
            .is_ignore()
    }

    fn relative<'a>(&self, path: &'a Path) -> Option<&'a Path> {
        if path.is_absolute() {
            path.strip_prefix(&self.root).ok()
        } else {
            Some(path)
        }
    }
}

fn compile(root: &Path, patterns: &[String]) -> Result<Gitignore> {
    let mut builder = GitignoreBuilder::new(root);

    for pattern in patterns {
        builder
            .add_line(None, pattern)
            .map_err(|e| Error::config(format!("invalid pattern '{pattern}': {e}")))?;
    }

    builder
        .build()
        .map_err(|e| Error::config(format!("failed to compile patterns: {e}")))
}
