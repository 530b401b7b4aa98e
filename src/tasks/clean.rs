// src/tasks/clean.rs

use tracing::debug;

use crate::errors::Result;
use crate::tasks::{TaskContext, TaskReport};

/// Remove every entry below `[paths].dist`, keeping the directory itself.
///
/// A missing distribution root is fine: there is nothing to clean.
pub fn run(ctx: &TaskContext) -> Result<TaskReport> {
    let dist = ctx.resolve(&ctx.config.paths.dist);
    let mut report = TaskReport::default();

    if !ctx.fs.is_dir(&dist) {
        debug!(?dist, "distribution root does not exist; nothing to clean");
        return Ok(report);
    }

    for entry in ctx.fs.read_dir(&dist)? {
        debug!(?entry, "removing");
        ctx.fs.remove_all(&entry)?;
        report.processed += 1;
    }

    Ok(report)
}
