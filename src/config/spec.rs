//! Immutable description of what to watch.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::watcher::{PathFilter, PatternProvider};
use crate::{Error, Result};

/// Default quiet period before a restart fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Validated watch configuration.
///
/// Built once at startup; every field is checked and every glob compiled
/// before a `WatchSpec` exists, so a watcher never starts half-configured.
#[derive(Debug, Clone)]
pub struct WatchSpec {
    root: PathBuf,
    include: Vec<String>,
    exclude: Vec<String>,
    debounce: Duration,
    filter: PathFilter,
}

impl WatchSpec {
    /// Validate and freeze a watch configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `root` is not a readable directory,
    /// if any pattern is malformed, or if `debounce` is zero.
    pub fn new(
        root: impl AsRef<Path>,
        include: Vec<String>,
        exclude: Vec<String>,
        debounce: Duration,
    ) -> Result<Self> {
        let root = validate_root(root.as_ref())?;

        if debounce.is_zero() {
            return Err(Error::config("debounce interval must be greater than 0"));
        }

        let filter = PathFilter::new(&root, &include, &exclude)?;

        Ok(Self {
            root,
            include,
            exclude,
            debounce,
            filter,
        })
    }

    /// Like [`WatchSpec::new`], filling unspecified pattern lists from `provider`.
    ///
    /// # Errors
    ///
    /// Same as [`WatchSpec::new`].
    pub fn with_provider(
        root: impl AsRef<Path>,
        include: Option<Vec<String>>,
        exclude: Option<Vec<String>>,
        debounce: Duration,
        provider: &dyn PatternProvider,
    ) -> Result<Self> {
        let root = validate_root(root.as_ref())?;
        let include = include.unwrap_or_else(|| provider.include_patterns(&root));
        let exclude = exclude.unwrap_or_else(|| provider.exclude_patterns(&root));
        Self::new(root, include, exclude, debounce)
    }

    /// Canonical root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Include globs as given.
    #[must_use]
    pub fn include(&self) -> &[String] {
        &self.include
    }

    /// Exclude globs as given.
    #[must_use]
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Quiet period before firing.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Compiled include/exclude policy.
    #[must_use]
    pub const fn filter(&self) -> &PathFilter {
        &self.filter
    }
}

fn validate_root(root: &Path) -> Result<PathBuf> {
    let canonical = root
        .canonicalize()
        .map_err(|e| Error::config(format!("watch root '{}': {e}", root.display())))?;

    if !canonical.is_dir() {
        return Err(Error::config(format!(
            "watch root '{}' is not a directory",
            root.display()
        )));
    }

    std::fs::read_dir(&canonical).map_err(|e| {
        Error::config(format!("watch root '{}' is not readable: {e}", root.display()))
    })?;

    Ok(canonical)
}
