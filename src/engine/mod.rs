// src/engine/mod.rs

//! Orchestration engine for the watch phase.
//!
//! This module ties together:
//! - the per-task trigger queue (what happens when a file changes while that
//!   task is already running)
//! - the main runtime event loop that reacts to:
//!   - file-watch triggers
//!   - task completion events
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::types::{ErrorPolicy, TaskKind};

/// Outcome of a task run as seen by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Every file was written.
    Success,
    /// Some files failed under `on_error = "log"`; the rest were written.
    Failed { failures: usize },
    /// The task returned an error.
    Errored,
}

/// Why a task was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Manual trigger (e.g. from the CLI or a test).
    Manual,
    /// Triggered due to a filesystem event.
    FileWatch,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Exit once no task is running and nothing is queued.
    pub exit_when_idle: bool,
    /// `abort` stops the runtime on the first errored task.
    pub on_error: ErrorPolicy,
}

/// Events flowing into the runtime from the watcher, the backend and signals.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A task should be run.
    TaskTriggered {
        task: TaskKind,
        reason: TriggerReason,
    },
    /// A task run finished with a concrete outcome.
    TaskCompleted {
        task: TaskKind,
        outcome: TaskOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod queue;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use queue::TriggerQueue;
pub use runtime::Runtime;
