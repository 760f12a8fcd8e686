//! File system watching and debounced restarts.
//!
//! This module provides:
//! - Recursive directory watching using notify-rs
//! - Include/exclude glob filtering
//! - Trailing-edge debouncing of change bursts
//! - Restart actions (shell command, systemd unit)

mod action;
mod debounce;
mod events;
mod filter;
mod patterns;
#[allow(clippy::module_inception)]
mod watcher;

pub use action::{service_name, CommandAction, RestartAction, SystemctlRestart};
pub use debounce::PendingTrigger;
pub use events::{ChangeEvent, ChangeKind};
pub use filter::PathFilter;
pub use patterns::{PatternProvider, ProjectPatterns, DEFAULT_EXCLUDES};
pub use watcher::{run_loop, Watcher, WatcherStats, WatcherStatsSnapshot};
