// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - handing tasks to the backend
//! - broadcasting reloads
//!
//! The core is intended to be extensively unit tested without any Tokio,
//! channels, filesystem, or compilers.

use crate::engine::event_handlers::{
    CoreStep, RunningTasks, handle_task_completion, handle_task_trigger,
};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeEvent, RuntimeOptions};
use crate::types::TaskKind;

/// Pure core runtime state.
///
/// This owns:
/// - the set of running tasks
/// - the trigger queue
/// - runtime options
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreRuntime {
    running: RunningTasks,
    queue: TriggerQueue,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(queue_length: usize, options: RuntimeOptions) -> Self {
        Self {
            running: RunningTasks::new(),
            queue: TriggerQueue::new(queue_length),
            options,
        }
    }

    /// True when no task is running.
    pub fn is_idle(&self) -> bool {
        self.running.is_empty()
    }

    pub fn is_running(&self, task: TaskKind) -> bool {
        self.running.contains_key(&task)
    }

    /// Expose queue emptiness (for tests).
    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::TaskTriggered { task, reason } => {
                handle_task_trigger(&mut self.running, &mut self.queue, task, reason)
            }
            RuntimeEvent::TaskCompleted { task, outcome } => handle_task_completion(
                &mut self.running,
                &mut self.queue,
                &self.options,
                task,
                outcome,
            ),
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CoreCommand, TaskOutcome, TriggerReason};
    use crate::types::ErrorPolicy;

    fn trigger(task: TaskKind) -> RuntimeEvent {
        RuntimeEvent::TaskTriggered {
            task,
            reason: TriggerReason::FileWatch,
        }
    }

    fn done(task: TaskKind, outcome: TaskOutcome) -> RuntimeEvent {
        RuntimeEvent::TaskCompleted { task, outcome }
    }

    #[test]
    fn markup_change_dispatches_only_markup() {
        let mut core = CoreRuntime::new(1, RuntimeOptions::default());

        let step = core.step(trigger(TaskKind::Markup));
        assert_eq!(step.commands, vec![CoreCommand::DispatchTask(TaskKind::Markup)]);
        assert!(core.is_running(TaskKind::Markup));
        assert!(!core.is_running(TaskKind::Style));

        let step = core.step(done(TaskKind::Markup, TaskOutcome::Success));
        assert!(step.commands.is_empty());
        assert!(step.keep_running);
        assert!(core.is_idle());
    }

    #[test]
    fn retrigger_while_running_is_replayed_once() {
        let mut core = CoreRuntime::new(1, RuntimeOptions::default());
        core.step(trigger(TaskKind::Style));

        for _ in 0..3 {
            let step = core.step(trigger(TaskKind::Style));
            assert!(step.commands.is_empty());
        }

        let step = core.step(done(TaskKind::Style, TaskOutcome::Success));
        assert_eq!(step.commands, vec![CoreCommand::DispatchTask(TaskKind::Style)]);

        let step = core.step(done(TaskKind::Style, TaskOutcome::Success));
        assert!(step.commands.is_empty());
        assert!(core.is_idle());
        assert!(core.queue_is_empty());
    }

    #[test]
    fn different_tasks_run_side_by_side() {
        let mut core = CoreRuntime::new(1, RuntimeOptions::default());
        let a = core.step(trigger(TaskKind::Style));
        let b = core.step(trigger(TaskKind::Script));
        assert_eq!(a.commands, vec![CoreCommand::DispatchTask(TaskKind::Style)]);
        assert_eq!(b.commands, vec![CoreCommand::DispatchTask(TaskKind::Script)]);
    }

    #[test]
    fn watched_script_rebuild_forces_reload() {
        let mut core = CoreRuntime::new(1, RuntimeOptions::default());
        core.step(trigger(TaskKind::Script));
        let step = core.step(done(TaskKind::Script, TaskOutcome::Success));
        assert_eq!(step.commands, vec![CoreCommand::BroadcastReload]);

        core.step(RuntimeEvent::TaskTriggered {
            task: TaskKind::Script,
            reason: TriggerReason::Manual,
        });
        let step = core.step(done(TaskKind::Script, TaskOutcome::Success));
        assert!(step.commands.is_empty());
    }

    #[test]
    fn errored_task_aborts_only_under_abort_policy() {
        let mut core = CoreRuntime::new(1, RuntimeOptions::default());
        core.step(trigger(TaskKind::Style));
        let step = core.step(done(TaskKind::Style, TaskOutcome::Errored));
        assert!(step.keep_running);

        let mut core = CoreRuntime::new(
            1,
            RuntimeOptions {
                exit_when_idle: false,
                on_error: ErrorPolicy::Abort,
            },
        );
        core.step(trigger(TaskKind::Style));
        let step = core.step(done(TaskKind::Style, TaskOutcome::Errored));
        assert_eq!(step.commands, vec![CoreCommand::Abort(TaskKind::Style)]);
        assert!(!step.keep_running);
    }

    #[test]
    fn exits_when_idle_if_asked() {
        let mut core = CoreRuntime::new(
            1,
            RuntimeOptions {
                exit_when_idle: true,
                on_error: ErrorPolicy::Log,
            },
        );
        core.step(trigger(TaskKind::Markup));
        let step = core.step(done(TaskKind::Markup, TaskOutcome::Failed { failures: 1 }));
        assert_eq!(step.commands, vec![CoreCommand::RequestExit]);
        assert!(!step.keep_running);
    }

    #[test]
    fn stray_completion_is_ignored() {
        let mut core = CoreRuntime::new(1, RuntimeOptions::default());
        let step = core.step(done(TaskKind::Clean, TaskOutcome::Success));
        assert!(step.commands.is_empty());
        assert!(step.keep_running);
    }
}
