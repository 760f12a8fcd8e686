//! Configuration management for sysdm.
//!
//! Two layers:
//! - `WatchSpec`: what to watch, validated once and never mutated
//! - `Config`: process settings such as logging, from CLI and environment

mod settings;
mod spec;

pub use settings::Config;
pub use spec::{WatchSpec, DEFAULT_DEBOUNCE};
