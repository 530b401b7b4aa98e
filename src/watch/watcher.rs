// src/watch/watcher.rs

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::RuntimeEvent;
use crate::watch::event_handler::process_batch;
use crate::watch::patterns::TaskWatchProfile;

/// Quiet period that closes a batch of notify events. One editor save
/// usually arrives as several events.
pub const DEBOUNCE: Duration = Duration::from_millis(200);

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher that observes `watch_dir` recursively and sends
/// `RuntimeEvent::TaskTriggered` for tasks whose patterns match a changed
/// path. Events are batched until none has arrived for [`DEBOUNCE`]; each
/// batch triggers a task at most once.
///
/// - `root` is the project root against which all glob patterns are evaluated.
/// - `watch_dir` is the directory handed to `notify` (usually `[paths].src`).
/// - `profiles` is the compiled per-task pattern set.
/// - `runtime_tx` is the channel into the main runtime.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    watch_dir: impl Into<PathBuf>,
    profiles: Vec<TaskWatchProfile>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    // Canonicalize once so we have a stable base path.
    let root = root.canonicalize().unwrap_or(root);
    // A missing source dir falls back to watching the whole project.
    let watch_dir = watch_dir
        .into()
        .canonicalize()
        .unwrap_or_else(|_| root.clone());

    let profiles = Arc::new(profiles);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // We can't log via tracing here easily, so fallback to stderr.
                    eprintln!("sitepipe: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("sitepipe: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&watch_dir, RecursiveMode::Recursive)?;

    info!("file watcher started on {:?}", watch_dir);

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let mut changed = BTreeSet::new();
            collect_paths(event, &mut changed);

            while let Ok(Some(event)) = tokio::time::timeout(DEBOUNCE, event_rx.recv()).await {
                collect_paths(event, &mut changed);
            }

            if changed.is_empty() {
                continue;
            }
            debug!(paths = changed.len(), "processing change batch");
            if !process_batch(&root, &changed, &profiles, &runtime_tx).await {
                debug!("runtime gone; stopping watcher loop");
                return;
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}

fn collect_paths(event: Event, changed: &mut BTreeSet<PathBuf>) {
    debug!(?event, "received notify event");
    if matches!(event.kind, EventKind::Access(_)) {
        return;
    }
    changed.extend(event.paths);
}
