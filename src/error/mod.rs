//! Error types and Result aliases for sysdm.
//!
//! This module defines the error hierarchy used throughout the crate.
//! All public functions return `Result<T, Error>` or `Result<T>`.

use thiserror::Error;

/// Result type alias using sysdm's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sysdm operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (bad root directory, malformed glob, zero debounce).
    #[error("configuration error: {0}")]
    Config(String),

    /// File watching error.
    #[error("watcher error: {0}")]
    Watcher(#[from] WatcherError),

    /// Internal failure, such as a restart action that panicked.
    #[error("internal error: {0}")]
    Internal(String),
}

/// File watcher errors.
#[derive(Error, Debug)]
pub enum WatcherError {
    /// Failed to subscribe to a path.
    #[error("failed to watch path '{path}': {reason}")]
    WatchFailed { path: String, reason: String },

    /// The OS notification facility reported an error.
    #[error("notification error: {0}")]
    Notification(String),

    /// The restart action failed.
    #[error("restart action failed: {0}")]
    Action(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error was caused by invalid configuration.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl WatcherError {
    /// Create a subscription failure for `path`.
    pub fn watch_failed(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::WatchFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Wrap a failed restart action, keeping the full cause chain.
    #[must_use]
    pub fn action(err: &anyhow::Error) -> Self {
        Self::Action(format!("{err:#}"))
    }
}

impl From<notify::Error> for WatcherError {
    fn from(err: notify::Error) -> Self {
        Self::Notification(err.to_string())
    }
}
