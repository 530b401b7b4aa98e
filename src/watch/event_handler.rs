// src/watch/event_handler.rs

//! Event processing logic for file system changes.

use std::collections::BTreeSet;
use std::path::Path;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::discover::slash_path;
use crate::engine::{RuntimeEvent, TriggerReason};
use crate::watch::patterns::TaskWatchProfile;

/// Process one batch of changed paths: every task whose profile matches at
/// least one of them is triggered once.
///
/// Returns `false` once the runtime channel is closed, so the caller can stop
/// its loop.
pub async fn process_batch<P: AsRef<Path>>(
    root: &Path,
    paths: impl IntoIterator<Item = P>,
    profiles: &[TaskWatchProfile],
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) -> bool {
    let mut tasks = BTreeSet::new();

    for path in paths {
        let path = path.as_ref();
        let Some(rel) = relative_str(root, path) else {
            warn!(?path, ?root, "could not relativize path against root");
            continue;
        };
        debug!(?path, rel = %rel, "normalized event path");

        for profile in profiles.iter().filter(|p| p.matches(&rel)) {
            debug!(task = %profile.task(), path = %rel, "watch match");
            tasks.insert(profile.task());
        }
    }

    for task in tasks {
        debug!(task = %task, "triggering task");
        if let Err(err) = runtime_tx
            .send(RuntimeEvent::TaskTriggered {
                task,
                reason: TriggerReason::FileWatch,
            })
            .await
        {
            warn!("failed to send RuntimeEvent::TaskTriggered: {err}");
            return false;
        }
    }
    true
}

/// `path` relative to `root`, with forward slashes.
///
/// Falls back to canonicalizing both sides, since some platforms report
/// event paths under a different absolute prefix (e.g. `/private/var` on
/// macOS). A deleted file cannot be canonicalized, so its parent is tried.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(slash_path(rel));
    }

    let root = root.canonicalize().ok()?;
    let canon = match path.canonicalize() {
        Ok(p) => p,
        Err(_) => path.parent()?.canonicalize().ok()?.join(path.file_name()?),
    };
    canon.strip_prefix(&root).ok().map(slash_path)
}
