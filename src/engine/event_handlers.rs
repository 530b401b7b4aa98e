// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeOptions, TaskOutcome, TriggerReason};
use crate::types::{ErrorPolicy, TaskKind};

/// Tasks currently running, with the reason their run was started.
pub type RunningTasks = BTreeMap<TaskKind, TriggerReason>;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Hand this task to the backend.
    DispatchTask(TaskKind),
    /// Push a full-page reload to every connected browser.
    BroadcastReload,
    /// A task errored under `on_error = "abort"`; stop with an error.
    Abort(TaskKind),
    /// Request that the runtime exits (idle with `exit_when_idle`).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub(crate) fn continue_with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Handle a task trigger event.
///
/// - If `task` is idle it is dispatched right away.
/// - If `task` is already running the trigger is queued and replayed when
///   the current run completes. Other tasks are unaffected.
pub fn handle_task_trigger(
    running: &mut RunningTasks,
    queue: &mut TriggerQueue,
    task: TaskKind,
    reason: TriggerReason,
) -> CoreStep {
    if running.contains_key(&task) {
        queue.record_trigger(task, reason);
        return CoreStep::continue_with(Vec::new());
    }

    debug!(task = %task, ?reason, "dispatching task");
    running.insert(task, reason);
    CoreStep::continue_with(vec![CoreCommand::DispatchTask(task)])
}

/// Handle a task completion event.
pub fn handle_task_completion(
    running: &mut RunningTasks,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    task: TaskKind,
    outcome: TaskOutcome,
) -> CoreStep {
    let Some(reason) = running.remove(&task) else {
        warn!(task = %task, "completion for a task that was not running; ignoring");
        return CoreStep::continue_with(Vec::new());
    };

    if outcome == TaskOutcome::Errored && options.on_error == ErrorPolicy::Abort {
        return CoreStep {
            commands: vec![CoreCommand::Abort(task)],
            keep_running: false,
        };
    }

    let mut commands = Vec::new();

    // Rebuilt bundles force a page reload on top of the task's own event.
    if task == TaskKind::Script
        && reason == TriggerReason::FileWatch
        && outcome != TaskOutcome::Errored
    {
        commands.push(CoreCommand::BroadcastReload);
    }

    if let Some(next) = queue.take(task) {
        running.insert(task, next);
        commands.push(CoreCommand::DispatchTask(task));
    }

    let mut keep_running = true;
    if options.exit_when_idle && running.is_empty() && queue.is_empty() {
        keep_running = false;
        commands.push(CoreCommand::RequestExit);
    }

    CoreStep {
        commands,
        keep_running,
    }
}
