// src/tasks/backend.rs

//! Pluggable task backend abstraction.
//!
//! The runtime talks to a `TaskBackend` instead of calling [`run_task`]
//! directly. Production uses [`RealTaskBackend`]; tests can plug in a backend
//! that records dispatches and reports completion without touching the disk.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::errors::Result;
use crate::types::TaskKind;

use super::{TaskContext, run_task};

/// Trait abstracting how a dispatched task is executed.
pub trait TaskBackend: Send {
    /// Start `task`. The implementation must eventually deliver exactly one
    /// `RuntimeEvent::TaskCompleted` for it.
    fn dispatch(&mut self, task: TaskKind) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Backend that runs the real tasks on the tokio runtime.
///
/// Each dispatch spawns a detached tokio task; the completion event is sent
/// once every output of the run has been written.
pub struct RealTaskBackend {
    ctx: TaskContext,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl RealTaskBackend {
    pub fn new(ctx: TaskContext, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self { ctx, runtime_tx }
    }
}

impl TaskBackend for RealTaskBackend {
    fn dispatch(&mut self, task: TaskKind) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let ctx = self.ctx.clone();
        let tx = self.runtime_tx.clone();

        Box::pin(async move {
            tokio::spawn(async move {
                let outcome = match run_task(task, &ctx).await {
                    Ok(report) if report.is_success() => TaskOutcome::Success,
                    Ok(report) => TaskOutcome::Failed {
                        failures: report.failed,
                    },
                    Err(err) => {
                        error!(task = %task, error = %err, "task errored");
                        TaskOutcome::Errored
                    }
                };

                if tx
                    .send(RuntimeEvent::TaskCompleted { task, outcome })
                    .await
                    .is_err()
                {
                    warn!(task = %task, "runtime gone before task completion was reported");
                }
            });
            Ok(())
        })
    }
}
