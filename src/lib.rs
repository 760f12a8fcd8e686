//! sysdm
//!
//! Watches a project directory and restarts a service once edits settle.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod observability;
pub mod watcher;

pub use config::{Config, WatchSpec};
pub use error::{Error, Result, WatcherError};
