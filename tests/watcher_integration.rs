//! Integration tests for the watcher against a real filesystem.

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sysdm::watcher::{ProjectPatterns, Watcher};
use sysdm::{Error, WatchSpec, WatcherError};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const DEBOUNCE: Duration = Duration::from_millis(200);

/// Time for the OS subscription to be established after spawning.
const SETTLE: Duration = Duration::from_millis(300);

fn python_spec(tmp: &TempDir) -> WatchSpec {
    WatchSpec::new(
        tmp.path(),
        vec!["*.py".to_string()],
        vec!["__pycache__/*".to_string()],
        DEBOUNCE,
    )
    .unwrap()
}

fn counting_action(count: &Arc<AtomicUsize>) -> impl FnMut() -> anyhow::Result<()> + Send {
    let count = Arc::clone(count);
    move || {
        count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Two quick writes to a watched file restart once; cache writes never do.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_python_project_scenario() {
    let tmp = TempDir::new().unwrap();
    let count = Arc::new(AtomicUsize::new(0));
    let cancel = CancellationToken::new();

    let task = tokio::spawn(Watcher::start(
        python_spec(&tmp),
        counting_action(&count),
        cancel.clone(),
    ));
    tokio::time::sleep(SETTLE).await;

    fs::write(tmp.path().join("a.py"), "print(1)\n").unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    fs::write(tmp.path().join("a.py"), "print(2)\n").unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0, "fired before quiet period");

    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    fs::create_dir_all(tmp.path().join("__pycache__")).unwrap();
    fs::write(tmp.path().join("__pycache__/a.pyc"), [0u8; 16]).unwrap();
    tokio::time::sleep(Duration::from_millis(800)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    cancel.cancel();
    task.await.unwrap().unwrap();
}

/// A failing restart leaves the watch running.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failing_action_keeps_watching() {
    let tmp = TempDir::new().unwrap();
    let attempts = Arc::new(AtomicUsize::new(0));
    let cancel = CancellationToken::new();

    let attempts_clone = Arc::clone(&attempts);
    let action = move || -> anyhow::Result<()> {
        attempts_clone.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("unit not found")
    };

    let task = tokio::spawn(Watcher::start(python_spec(&tmp), action, cancel.clone()));
    tokio::time::sleep(SETTLE).await;

    fs::write(tmp.path().join("a.py"), "x = 1\n").unwrap();
    tokio::time::sleep(Duration::from_millis(800)).await;
    fs::write(tmp.path().join("b.py"), "y = 2\n").unwrap();
    tokio::time::sleep(Duration::from_millis(800)).await;

    assert_eq!(attempts.load(Ordering::SeqCst), 2);

    cancel.cancel();
    task.await.unwrap().unwrap();
}

/// Cancelling during the quiet period drops the pending restart.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_drops_pending_restart() {
    let tmp = TempDir::new().unwrap();
    let count = Arc::new(AtomicUsize::new(0));
    let cancel = CancellationToken::new();

    let task = tokio::spawn(Watcher::start(
        python_spec(&tmp),
        counting_action(&count),
        cancel.clone(),
    ));
    tokio::time::sleep(SETTLE).await;

    fs::write(tmp.path().join("a.py"), "pass\n").unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("watcher did not stop promptly")
        .unwrap()
        .unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

/// Inferred patterns pick up the project's own file types.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_inferred_patterns_trigger() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("main.rs"), "fn main() {}\n").unwrap();
    fs::create_dir_all(tmp.path().join("target")).unwrap();

    let spec =
        WatchSpec::with_provider(tmp.path(), None, None, DEBOUNCE, &ProjectPatterns).unwrap();
    assert_eq!(spec.include(), ["*.rs"]);

    let count = Arc::new(AtomicUsize::new(0));
    let cancel = CancellationToken::new();
    let task = tokio::spawn(Watcher::start(spec, counting_action(&count), cancel.clone()));
    tokio::time::sleep(SETTLE).await;

    fs::write(tmp.path().join("target/build.rs"), "// generated\n").unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);

    fs::write(tmp.path().join("main.rs"), "fn main() { println!(); }\n").unwrap();
    tokio::time::sleep(Duration::from_millis(800)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    cancel.cancel();
    task.await.unwrap().unwrap();
}

/// A root that vanishes before subscribing surfaces a watch failure.
#[tokio::test]
async fn test_subscription_failure_is_returned() {
    let tmp = TempDir::new().unwrap();
    let project = tmp.path().join("proj");
    fs::create_dir_all(&project).unwrap();

    let spec = WatchSpec::new(&project, vec!["*.py".to_string()], vec![], DEBOUNCE).unwrap();
    fs::remove_dir_all(&project).unwrap();

    let count = Arc::new(AtomicUsize::new(0));
    let result = tokio::time::timeout(
        Duration::from_secs(2),
        Watcher::start(spec, counting_action(&count), CancellationToken::new()),
    )
    .await
    .expect("start did not fail fast");

    match result {
        Err(Error::Watcher(WatcherError::WatchFailed { path, .. })) => {
            assert!(path.ends_with("proj"), "unexpected path {path}");
        }
        other => panic!("expected a watch failure, got {other:?}"),
    }
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

/// Bad configuration is rejected before anything is watched.
#[test]
fn test_invalid_configuration_rejected() {
    let tmp = TempDir::new().unwrap();

    assert!(WatchSpec::new(tmp.path().join("missing"), vec![], vec![], DEBOUNCE)
        .unwrap_err()
        .is_config());
    assert!(
        WatchSpec::new(tmp.path(), vec!["*.{py".to_string()], vec![], DEBOUNCE)
            .unwrap_err()
            .is_config()
    );
}
