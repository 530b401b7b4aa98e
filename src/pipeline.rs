// src/pipeline.rs

//! Top-level sequencing.
//!
//! `build` runs clean -> style -> markup -> script, each task resolving only
//! once its outputs are written. `dev` follows that with a watcher, the dev
//! server and the watch runtime.

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use crate::errors::{Result, SitepipeError};
use crate::server::{DevServer, open_browser};
use crate::tasks::{RealTaskBackend, TaskContext, TaskReport, run_task};
use crate::types::TaskKind;
use crate::watch::{WatcherHandle, build_profiles_from_config, spawn_watcher};

/// Order of the one-shot build.
pub const BUILD_SEQUENCE: [TaskKind; 4] = [
    TaskKind::Clean,
    TaskKind::Style,
    TaskKind::Markup,
    TaskKind::Script,
];

/// Reports of a finished build, in run order.
#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    pub reports: Vec<(TaskKind, TaskReport)>,
}

impl BuildSummary {
    pub fn failed(&self) -> usize {
        self.reports.iter().map(|(_, r)| r.failed).sum()
    }

    pub fn report(&self, task: TaskKind) -> Option<TaskReport> {
        self.reports
            .iter()
            .find(|(kind, _)| *kind == task)
            .map(|(_, r)| *r)
    }
}

/// Run `tasks` one after the other, stopping at the first error.
pub async fn run_sequence(ctx: &TaskContext, tasks: &[TaskKind]) -> Result<BuildSummary> {
    let mut summary = BuildSummary::default();
    for &task in tasks {
        let report = run_task(task, ctx).await?;
        summary.reports.push((task, report));
    }
    Ok(summary)
}

/// Clean and build everything once. No watcher, no server.
pub async fn build(ctx: &TaskContext) -> Result<BuildSummary> {
    let summary = run_sequence(ctx, &BUILD_SEQUENCE).await?;
    match summary.failed() {
        0 => info!("build complete"),
        failed => warn!(failed, "build complete with failed files"),
    }
    Ok(summary)
}

/// Build, then watch every asset class and serve `[server].base_dir` with
/// live reload until Ctrl-C.
pub async fn dev(ctx: &TaskContext) -> Result<()> {
    build(ctx).await?;

    let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);
    let _watcher = watch(ctx, &TaskKind::WATCHED, tx.clone())?;

    let server = DevServer::bind(ctx).await?;
    let url = server.url();
    let mut server_task = tokio::spawn(server.serve());

    if ctx.config.server.open {
        open_browser(&url);
    }
    spawn_ctrl_c(tx.clone());

    let runtime = watch_runtime(ctx, rx, tx);
    let result = tokio::select! {
        res = runtime.run() => res,
        joined = &mut server_task => match joined {
            Ok(res) => res,
            Err(err) => Err(SitepipeError::Server(err.to_string())),
        },
    };

    server_task.abort();
    result
}

/// Run a single task once; with `keep_watching`, re-run it whenever its
/// sources change until Ctrl-C.
pub async fn single(ctx: &TaskContext, task: TaskKind, keep_watching: bool) -> Result<TaskReport> {
    let report = run_task(task, ctx).await?;

    if keep_watching && TaskKind::WATCHED.contains(&task) {
        let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);
        let _watcher = watch(ctx, &[task], tx.clone())?;
        spawn_ctrl_c(tx.clone());
        watch_runtime(ctx, rx, tx).run().await?;
    }

    Ok(report)
}

fn watch(
    ctx: &TaskContext,
    tasks: &[TaskKind],
    tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let profiles = build_profiles_from_config(&ctx.config)?
        .into_iter()
        .filter(|p| tasks.contains(&p.task()))
        .collect();
    let watch_dir = ctx.resolve(&ctx.config.paths.src);
    Ok(spawn_watcher(&ctx.root, watch_dir, profiles, tx)?)
}

fn watch_runtime(
    ctx: &TaskContext,
    rx: mpsc::Receiver<RuntimeEvent>,
    tx: mpsc::Sender<RuntimeEvent>,
) -> Runtime<RealTaskBackend> {
    let options = RuntimeOptions {
        exit_when_idle: false,
        on_error: ctx.config.config.on_error,
    };
    let core = CoreRuntime::new(ctx.config.config.queue_length, options);
    let backend = RealTaskBackend::new(ctx.clone(), tx);
    Runtime::new(core, rx, backend, ctx.reload.clone())
}

/// Ctrl-C -> graceful shutdown.
fn spawn_ctrl_c(tx: mpsc::Sender<RuntimeEvent>) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
    });
}
