use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use sitepipe::engine::{RuntimeEvent, TaskOutcome};
use sitepipe::errors::Result;
use sitepipe::tasks::TaskBackend;
use sitepipe::types::TaskKind;
use tokio::sync::mpsc;

/// A fake backend that:
/// - records which tasks were dispatched
/// - immediately reports `TaskCompleted` with a fixed outcome.
pub struct FakeBackend {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    executed: Arc<Mutex<Vec<TaskKind>>>,
    outcome: TaskOutcome,
}

impl FakeBackend {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, executed: Arc<Mutex<Vec<TaskKind>>>) -> Self {
        Self {
            runtime_tx,
            executed,
            outcome: TaskOutcome::Success,
        }
    }

    pub fn with_outcome(mut self, outcome: TaskOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

impl TaskBackend for FakeBackend {
    fn dispatch(&mut self, task: TaskKind) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let executed = Arc::clone(&self.executed);
        let outcome = self.outcome;

        Box::pin(async move {
            executed.lock().unwrap().push(task);

            tx.send(RuntimeEvent::TaskCompleted { task, outcome })
                .await
                .map_err(anyhow::Error::from)?;
            Ok(())
        })
    }
}
