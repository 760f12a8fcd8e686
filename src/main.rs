//! sysdm - restart a service when its sources change
//!
//! Entry point for the `sysdm` command.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use sysdm::config::DEFAULT_DEBOUNCE;
use sysdm::observability::{init_tracing, TracingConfig};
use sysdm::watcher::{CommandAction, ProjectPatterns, SystemctlRestart, Watcher};
use sysdm::{Config, Error, Result, WatchSpec};
use tokio_util::sync::CancellationToken;

/// sysdm - restart a service when its sources change
#[derive(Parser, Debug)]
#[command(name = "sysdm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "SYSDM_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, global = true, env = "SYSDM_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch a directory and restart a unit or command on changes
    Watch(WatchArgs),
}

#[derive(Args, Debug)]
struct WatchArgs {
    /// Directory to watch
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Patterns of files to watch (by default inferred)
    #[arg(short = 'w', long = "extensions", num_args = 1..)]
    extensions: Option<Vec<String>>,

    /// Patterns of files to ignore (by default inferred)
    #[arg(long = "exclude-patterns", num_args = 1..)]
    exclude_patterns: Option<Vec<String>>,

    /// Seconds without changes before restarting
    #[arg(short, long, default_value_t = DEFAULT_DEBOUNCE.as_secs_f64())]
    delay: f64,

    /// Unit to restart through systemctl
    #[arg(long, conflicts_with = "exec", required_unless_present = "exec")]
    unit: Option<String>,

    /// Restart a system unit instead of a user unit
    #[arg(long, requires = "unit")]
    system: bool,

    /// Shell command to run instead of restarting a unit
    #[arg(long)]
    exec: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        log_level: cli.log_level,
        log_json: cli.log_json,
    };
    config.validate()?;
    init_tracing(&TracingConfig::from(&config));

    tracing::debug!(?config, "Configuration loaded");

    match cli.command {
        Command::Watch(args) => watch(args).await,
    }
}

async fn watch(args: WatchArgs) -> Result<()> {
    let debounce = parse_delay(args.delay)?;
    let spec = WatchSpec::with_provider(
        &args.root,
        args.extensions,
        args.exclude_patterns,
        debounce,
        &ProjectPatterns,
    )?;

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn(cancel_on_interrupt(tokio::signal::ctrl_c(), cancel.clone()));

    let outcome = match (args.unit, args.exec) {
        (Some(unit), _) => {
            let action = if args.system {
                SystemctlRestart::system(&unit)
            } else {
                SystemctlRestart::user(&unit)
            };
            Watcher::start(spec, action, cancel).await
        }
        (None, Some(command)) => {
            let action = CommandAction::new(command).current_dir(spec.root());
            Watcher::start(spec, action, cancel).await
        }
        (None, None) => Err(Error::config("either --unit or --exec is required")),
    };

    if interrupt.is_finished() {
        interrupt
            .await
            .map_err(|e| Error::internal(format!("interrupt listener failed: {e}")))??;
    } else {
        interrupt.abort();
    }
    outcome
}

/// Cancel `cancel` once `signal` resolves.
///
/// A listener that cannot be installed also cancels, so the watch never
/// runs without a way to stop it, and the cause is returned.
async fn cancel_on_interrupt<F>(signal: F, cancel: CancellationToken) -> Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    let result = signal.await;
    cancel.cancel();

    match result {
        Ok(()) => {
            tracing::info!("Interrupted, shutting down");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Cannot listen for Ctrl-C, stopping");
            Err(Error::internal(format!("cannot listen for Ctrl-C: {e}")))
        }
    }
}

fn parse_delay(seconds: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(seconds)
        .ok()
        .filter(|d| !d.is_zero())
        .ok_or_else(|| Error::config(format!("invalid delay '{seconds}', must be > 0 seconds")))
}
