// src/tasks/mod.rs

//! The pipeline tasks.
//!
//! - [`clean`] empties the distribution root.
//! - [`style`] compiles SCSS, prefixes for the configured browsers and
//!   writes source maps.
//! - [`markup`] minifies HTML.
//! - [`script`] bundles, transpiles and minifies every entry script.
//! - [`backend`] provides the `TaskBackend` trait the engine dispatches to.
//!
//! Every task resolves only once all of its outputs are on disk.

pub mod backend;
pub mod clean;
pub mod markup;
pub mod script;
pub mod style;

pub use backend::{RealTaskBackend, TaskBackend};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use tracing::{error, info};

use crate::config::SiteConfig;
use crate::config::validate::normalize_dir;
use crate::discover::slash_path;
use crate::errors::{Result, SitepipeError};
use crate::fs::{FileSystem, RealFileSystem};
use crate::reload::LiveReload;
use crate::types::{ErrorPolicy, TaskKind};

/// Everything a task needs: where the project is, how it is configured, how
/// to touch the disk and where to announce finished outputs.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub root: PathBuf,
    pub config: Arc<SiteConfig>,
    pub fs: Arc<dyn FileSystem>,
    pub reload: LiveReload,
}

impl TaskContext {
    pub fn new(root: impl Into<PathBuf>, config: Arc<SiteConfig>, reload: LiveReload) -> Self {
        Self::with_fs(root, config, Arc::new(RealFileSystem), reload)
    }

    pub fn with_fs(
        root: impl Into<PathBuf>,
        config: Arc<SiteConfig>,
        fs: Arc<dyn FileSystem>,
        reload: LiveReload,
    ) -> Self {
        Self {
            root: root.into(),
            config,
            fs,
            reload,
        }
    }

    /// Resolve a config-relative path against the project root.
    pub fn resolve(&self, rel: &str) -> PathBuf {
        self.root.join(normalize_dir(rel))
    }

    /// URL path under which the dev server exposes `output` (a path on disk
    /// below the project root), or `None` if it lies outside `server.base_dir`.
    pub fn served_path(&self, output: &Path) -> Option<String> {
        let base = self.resolve(&self.config.server.base_dir);
        let rel = output.strip_prefix(&base).ok()?;
        Some(format!("/{}", slash_path(rel)))
    }

    /// Apply `[config].on_error` to a failure of a single file.
    ///
    /// Under `log` the error is reported and counted; under `abort` it is
    /// handed back to the caller.
    pub(crate) fn record_failure(
        &self,
        task: TaskKind,
        report: &mut TaskReport,
        err: SitepipeError,
    ) -> Result<()> {
        report.failed += 1;
        match self.config.config.on_error {
            ErrorPolicy::Log => {
                error!(task = %task, error = %err, "file failed; continuing");
                Ok(())
            }
            ErrorPolicy::Abort => Err(err),
        }
    }
}

/// Summary of a finished task run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskReport {
    /// Files written (or, for `clean`, entries removed).
    pub processed: usize,
    /// Files that failed and were skipped.
    pub failed: usize,
}

impl TaskReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Run one task to completion.
pub async fn run_task(kind: TaskKind, ctx: &TaskContext) -> Result<TaskReport> {
    info!(task = %kind, "starting task");
    let started = Instant::now();

    let report = match kind {
        TaskKind::Script => script::run(ctx).await?,
        TaskKind::Clean => run_blocking(ctx, clean::run).await?,
        TaskKind::Style => run_blocking(ctx, style::run).await?,
        TaskKind::Markup => run_blocking(ctx, markup::run).await?,
    };

    info!(
        task = %kind,
        processed = report.processed,
        failed = report.failed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "task finished"
    );
    Ok(report)
}

/// Filesystem-bound tasks run on the blocking pool.
async fn run_blocking(
    ctx: &TaskContext,
    task: fn(&TaskContext) -> Result<TaskReport>,
) -> Result<TaskReport> {
    let ctx = ctx.clone();
    tokio::task::spawn_blocking(move || task(&ctx))
        .await
        .map_err(|e| SitepipeError::Other(anyhow!(e)))?
}
