//! Debounced file watcher using notify-rs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher as _};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use super::action::RestartAction;
use super::debounce::PendingTrigger;
use super::events::ChangeEvent;
use super::filter::PathFilter;
use crate::config::WatchSpec;
use crate::error::WatcherError;
use crate::{Error, Result};

/// Capacity of the channel between the notify thread and the watch loop.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Counters for one watch session.
#[derive(Debug, Default)]
pub struct WatcherStats {
    pub events_seen: AtomicU64,
    pub events_filtered: AtomicU64,
    pub triggers_fired: AtomicU64,
    pub actions_failed: AtomicU64,
}

impl WatcherStats {
    /// Create new stats tracker.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Get snapshot of current stats.
    #[must_use]
    pub fn snapshot(&self) -> WatcherStatsSnapshot {
        WatcherStatsSnapshot {
            events_seen: self.events_seen.load(Ordering::Relaxed),
            events_filtered: self.events_filtered.load(Ordering::Relaxed),
            triggers_fired: self.triggers_fired.load(Ordering::Relaxed),
            actions_failed: self.actions_failed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of watcher stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherStatsSnapshot {
    pub events_seen: u64,
    pub events_filtered: u64,
    pub triggers_fired: u64,
    pub actions_failed: u64,
}

/// Watches one directory tree and restarts something when it settles.
pub struct Watcher {
    spec: WatchSpec,
    stats: Arc<WatcherStats>,
}

impl Watcher {
    /// Create a watcher for a validated spec. Nothing is subscribed yet.
    #[must_use]
    pub fn new(spec: WatchSpec) -> Self {
        Self {
            spec,
            stats: WatcherStats::new(),
        }
    }

    /// Shared handle to this watcher's counters.
    #[must_use]
    pub fn stats(&self) -> Arc<WatcherStats> {
        Arc::clone(&self.stats)
    }

    /// Convenience for `Watcher::new(spec).run(action, cancel)`.
    ///
    /// # Errors
    ///
    /// See [`Watcher::run`].
    pub async fn start<A: RestartAction + 'static>(
        spec: WatchSpec,
        action: A,
        cancel: CancellationToken,
    ) -> Result<()> {
        Self::new(spec).run(action, cancel).await
    }

    /// Subscribe to the root and run until `cancel` fires.
    ///
    /// The OS subscription lives exactly as long as this call.
    ///
    /// # Errors
    ///
    /// Returns a watcher error if the notification subscription cannot be
    /// established, or an internal error if the action panics. Action
    /// failures are logged and never returned.
    pub async fn run<A: RestartAction + 'static>(
        self,
        action: A,
        cancel: CancellationToken,
    ) -> Result<()> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let root = self.spec.root().to_path_buf();

        let mut os_watcher = RecommendedWatcher::new(
            move |result: notify::Result<notify::Event>| match result {
                Ok(event) => {
                    for change in ChangeEvent::from_notify(event) {
                        if tx.blocking_send(change).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Watch error");
                }
            },
            notify::Config::default(),
        )
        .map_err(WatcherError::from)?;

        os_watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| WatcherError::watch_failed(root.display().to_string(), e))?;

        tracing::info!(
            root = %root.display(),
            include = ?self.spec.include(),
            exclude = ?self.spec.exclude(),
            debounce_ms = self.spec.debounce().as_millis(),
            "Watching directory"
        );

        let outcome = run_loop(
            rx,
            self.spec.filter(),
            self.spec.debounce(),
            action,
            &self.stats,
            &cancel,
        )
        .await;

        drop(os_watcher);
        tracing::info!(stats = ?self.stats.snapshot(), "Stopped watching directory");
        outcome
    }
}

/// Filter, debounce and fire over any source of change events.
///
/// Returns when `cancel` fires or the event channel closes. A pending
/// trigger never fires after cancellation has been observed. A due
/// trigger is served before queued events so noisy excluded paths cannot
/// hold it back.
///
/// The action runs on the blocking pool, one restart at a time, so a slow
/// restart never stalls the runtime. Cancellation stops waiting for it.
///
/// # Errors
///
/// Returns an internal error if the action panics.
pub async fn run_loop<A: RestartAction + 'static>(
    mut events: mpsc::Receiver<ChangeEvent>,
    filter: &PathFilter,
    interval: Duration,
    action: A,
    stats: &WatcherStats,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut trigger = PendingTrigger::default();
    let mut action = Some(action);

    loop {
        let deadline = trigger.deadline();

        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                if trigger.is_pending() {
                    tracing::debug!("Dropping pending restart on cancellation");
                }
                trigger.reset();
                break;
            }

            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if trigger.fire_if_due(Instant::now()) {
                    let Some(current) = action.take() else {
                        break;
                    };
                    match fire(current, stats, cancel).await? {
                        Some(returned) => action = Some(returned),
                        None => break,
                    }
                }
            }

            received = events.recv() => {
                let Some(event) = received else {
                    tracing::debug!("Event channel closed");
                    break;
                };
                stats.events_seen.fetch_add(1, Ordering::Relaxed);

                if filter.qualifies(event.path()) {
                    tracing::debug!(
                        path = %event.path().display(),
                        kind = event.kind.as_str(),
                        "Change detected"
                    );
                    trigger.observe(event.timestamp, interval);
                } else {
                    stats.events_filtered.fetch_add(1, Ordering::Relaxed);
                    tracing::trace!(path = %event.path().display(), "Change ignored");
                }
            }
        }
    }

    Ok(())
}

/// Run one restart on the blocking pool and hand the action back.
///
/// Returns `None` when cancelled mid-restart; the detached restart is left
/// to finish on its own and its result is discarded.
async fn fire<A: RestartAction + 'static>(
    mut action: A,
    stats: &WatcherStats,
    cancel: &CancellationToken,
) -> Result<Option<A>> {
    stats.triggers_fired.fetch_add(1, Ordering::Relaxed);
    tracing::info!("Changes settled, restarting");

    let mut handle = tokio::task::spawn_blocking(move || {
        let outcome = action.restart();
        (action, outcome)
    });

    let (action, outcome) = tokio::select! {
        biased;

        () = cancel.cancelled() => {
            tracing::warn!("Cancelled while a restart was running, not waiting for it");
            return Ok(None);
        }

        joined = &mut handle => {
            joined.map_err(|e| Error::internal(format!("restart action panicked: {e}")))?
        }
    };

    if let Err(e) = outcome {
        stats.actions_failed.fetch_add(1, Ordering::Relaxed);
        let err = WatcherError::action(&e);
        tracing::error!(error = %err, "Restart failed, still watching");
    }
    Ok(Some(action))
}
