//! Structured logging configuration.
//!
//! Log lines go to stderr as plain text or JSON. `RUST_LOG` overrides the
//! configured level when set.

use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Registry,
};

/// Tracing configuration options.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable JSON output format
    pub json: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl From<&crate::Config> for TracingConfig {
    fn from(config: &crate::Config) -> Self {
        Self {
            level: config.log_level.clone(),
            json: config.log_json,
        }
    }
}

/// Initialize tracing with the given configuration.
///
/// # Panics
///
/// Panics if a global subscriber has already been installed in this process.
pub fn init_tracing(config: &TracingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json {
        let json_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true);

        Registry::default().with(env_filter).with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

        Registry::default().with(env_filter).with(fmt_layer).init();
    }

    tracing::debug!(level = %config.level, json = config.json, "Tracing initialized");
}
