// src/engine/queue.rs

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::engine::TriggerReason;
use crate::types::TaskKind;

#[derive(Debug, Clone, Copy)]
struct Pending {
    runs: usize,
    reason: TriggerReason,
}

/// Re-runs requested for tasks that were busy when their trigger arrived.
///
/// Semantics:
/// - Each task has its own slot; triggers for different tasks never merge.
/// - `max_pending` (from `[config].queue_length`) caps how many follow-up
///   runs a single task can accumulate. With the default of 1, any burst of
///   changes during a run collapses into exactly one re-run.
/// - The reason of the latest trigger wins, so a file change queued behind a
///   manual run still counts as a file-watch run.
#[derive(Debug)]
pub struct TriggerQueue {
    max_pending: usize,
    pending: BTreeMap<TaskKind, Pending>,
}

impl TriggerQueue {
    /// `max_pending` is clamped to at least 1.
    pub fn new(max_pending: usize) -> Self {
        Self {
            max_pending: max_pending.max(1),
            pending: BTreeMap::new(),
        }
    }

    /// Returns true if no task has a queued re-run.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of queued re-runs for `task`.
    pub fn pending_runs(&self, task: TaskKind) -> usize {
        self.pending.get(&task).map_or(0, |p| p.runs)
    }

    /// Record that `task` was triggered while it was running.
    pub fn record_trigger(&mut self, task: TaskKind, reason: TriggerReason) {
        let max = self.max_pending;
        let entry = self.pending.entry(task).or_insert(Pending { runs: 0, reason });
        entry.reason = reason;

        if entry.runs < max {
            entry.runs += 1;
            debug!(task = %task, queued = entry.runs, "queued re-run");
        } else {
            warn!(
                task = %task,
                max_pending = max,
                "queue_length reached; coalescing trigger into the queued re-run"
            );
        }
    }

    /// Pop one queued run for `task`, if any.
    pub fn take(&mut self, task: TaskKind) -> Option<TriggerReason> {
        let entry = self.pending.get_mut(&task)?;
        let reason = entry.reason;
        entry.runs -= 1;
        if entry.runs == 0 {
            self.pending.remove(&task);
        }
        debug!(task = %task, "replaying queued trigger");
        Some(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bursts_coalesce_to_queue_length() {
        let mut q = TriggerQueue::new(1);
        for _ in 0..5 {
            q.record_trigger(TaskKind::Style, TriggerReason::FileWatch);
        }
        assert_eq!(q.pending_runs(TaskKind::Style), 1);
        assert_eq!(q.take(TaskKind::Style), Some(TriggerReason::FileWatch));
        assert_eq!(q.take(TaskKind::Style), None);
        assert!(q.is_empty());
    }

    #[test]
    fn tasks_have_independent_slots() {
        let mut q = TriggerQueue::new(2);
        q.record_trigger(TaskKind::Style, TriggerReason::Manual);
        q.record_trigger(TaskKind::Script, TriggerReason::FileWatch);
        q.record_trigger(TaskKind::Script, TriggerReason::FileWatch);
        q.record_trigger(TaskKind::Script, TriggerReason::FileWatch);

        assert_eq!(q.pending_runs(TaskKind::Style), 1);
        assert_eq!(q.pending_runs(TaskKind::Script), 2);
        assert_eq!(q.pending_runs(TaskKind::Markup), 0);
    }

    #[test]
    fn latest_reason_wins() {
        let mut q = TriggerQueue::new(1);
        q.record_trigger(TaskKind::Script, TriggerReason::Manual);
        q.record_trigger(TaskKind::Script, TriggerReason::FileWatch);
        assert_eq!(q.take(TaskKind::Script), Some(TriggerReason::FileWatch));
    }
}
