//! File system change events.

#![allow(clippy::missing_const_for_fn)]

use std::path::{Path, PathBuf};

use notify::event::{EventKind, ModifyKind};
use tokio::time::Instant;

/// Kind of change reported by the OS.
///
/// Every kind contributes equally to the debounce; the kind is kept for
/// logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// File or directory was created.
    Created,
    /// File contents or metadata changed.
    Modified,
    /// File or directory was removed.
    Deleted,
    /// File or directory was renamed.
    Renamed,
}

impl ChangeKind {
    /// Map a notify event kind, dropping kinds that do not change files.
    #[must_use]
    pub fn from_notify(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(Self::Created),
            EventKind::Modify(ModifyKind::Name(_)) => Some(Self::Renamed),
            EventKind::Modify(_) | EventKind::Any => Some(Self::Modified),
            EventKind::Remove(_) => Some(Self::Deleted),
            EventKind::Access(_) | EventKind::Other => None,
        }
    }

    /// Short lowercase label used in log lines.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Renamed => "renamed",
        }
    }
}

/// A single filesystem notification for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Path that changed.
    pub path: PathBuf,
    /// Type of change.
    pub kind: ChangeKind,
    /// When the event was received.
    pub timestamp: Instant,
}

impl ChangeEvent {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
            timestamp: Instant::now(),
        }
    }

    /// Path associated with this event.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Split a notify event into one change event per path.
    #[must_use]
    pub fn from_notify(event: notify::Event) -> Vec<Self> {
        let Some(kind) = ChangeKind::from_notify(&event.kind) else {
            return Vec::new();
        };
        let timestamp = Instant::now();

        event
            .paths
            .into_iter()
            .map(|path| Self {
                path,
                kind,
                timestamp,
            })
            .collect()
    }
}
