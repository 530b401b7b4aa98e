// src/tasks/script/mod.rs

//! Script task: one bundle per entry file.
//!
//! Entries are discovered once per run. Every entry is bundled and compiled
//! on its own blocking worker, so a broken entry never stops the others.

pub mod bundle;
pub mod compile;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::discover::{SourceFile, discover, slash_path};
use crate::errors::{Result, SitepipeError};
use crate::reload::ReloadEvent;
use crate::tasks::{TaskContext, TaskReport};
use crate::types::TaskKind;

use bundle::Bundler;
use compile::{CompileOptions, compile};

pub async fn run(ctx: &TaskContext) -> Result<TaskReport> {
    let cfg = &ctx.config.script;
    let out_dir = ctx.resolve(&cfg.out);
    let entries = discover(ctx.fs.as_ref(), &ctx.root, &cfg.input)?;
    warn_on_name_collisions(&entries, &cfg.suffix);

    let mut workers = JoinSet::new();
    for entry in entries {
        let ctx = ctx.clone();
        let out_dir = out_dir.clone();
        workers.spawn_blocking(move || {
            let name = slash_path(&entry.rel);
            let result = build_entry(&ctx, &entry, &out_dir);
            (name, result)
        });
    }

    let mut report = TaskReport::default();
    let mut first_error = None;

    while let Some(joined) = workers.join_next().await {
        let (name, result) = joined.map_err(|e| SitepipeError::Other(anyhow!(e)))?;
        match result {
            Ok(target) => {
                debug!(entry = %name, ?target, "wrote bundle");
                report.processed += 1;
            }
            // Keep draining so every other entry still finishes.
            Err(err) => {
                if let Err(err) = ctx.record_failure(TaskKind::Script, &mut report, err) {
                    first_error.get_or_insert(err);
                }
            }
        }
    }

    if let Some(err) = first_error {
        return Err(err);
    }
    if report.processed > 0 {
        ctx.reload.send(ReloadEvent::Reload);
    }
    Ok(report)
}

/// `app.js` + `.min.js` -> `app.min.js`.
pub fn output_name(entry: &Path, suffix: &str) -> String {
    let stem = entry
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{stem}{suffix}")
}

fn build_entry(ctx: &TaskContext, entry: &SourceFile, out_dir: &Path) -> Result<PathBuf> {
    let cfg = &ctx.config.script;
    let name = slash_path(&entry.rel);
    let script_error = |e: anyhow::Error| SitepipeError::Script {
        path: name.clone(),
        message: format!("{e:#}"),
    };

    let bundled = Bundler::new(ctx.fs.as_ref())
        .bundle(&entry.path)
        .map_err(script_error)?;
    debug!(entry = %name, modules = bundled.modules.len(), "bundled");

    let compiled = compile(
        &bundle_name(&entry.rel),
        bundled.code,
        CompileOptions {
            target: cfg.target,
            minify: cfg.minify,
            source_maps: cfg.source_maps,
        },
    )
    .map_err(script_error)?;

    let file_name = output_name(&entry.path, &cfg.suffix);
    let target = out_dir.join(&file_name);
    let mut code = compiled.code;

    if let Some(map) = compiled.map {
        let map_name = format!("{file_name}.map");
        code.push_str(&format!("\n//# sourceMappingURL={map_name}\n"));
        ctx.fs.write(&out_dir.join(&map_name), map.as_bytes())?;
    }
    ctx.fs.write(&target, code.as_bytes())?;

    Ok(target)
}

/// Source name recorded in the map: `lib/app.js` -> `lib/app.bundle.js`.
fn bundle_name(rel: &Path) -> String {
    slash_path(&rel.with_extension("bundle.js"))
}

/// Outputs are flat, so `a/app.js` and `b/app.js` would overwrite each other.
fn warn_on_name_collisions(entries: &[SourceFile], suffix: &str) {
    let mut seen: HashMap<String, &Path> = HashMap::new();
    for entry in entries {
        let name = output_name(&entry.path, suffix);
        if let Some(previous) = seen.insert(name.clone(), &entry.rel) {
            warn!(
                output = %name,
                first = %previous.display(),
                second = %entry.rel.display(),
                "two script entries produce the same output file and will overwrite each other"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_replaces_extension_with_suffix() {
        assert_eq!(output_name(Path::new("src/scripts/app.js"), ".min.js"), "app.min.js");
        assert_eq!(output_name(Path::new("main.js"), ".bundle.js"), "main.bundle.js");
    }

    #[test]
    fn bundle_name_keeps_the_directory() {
        assert_eq!(bundle_name(Path::new("lib/app.js")), "lib/app.bundle.js");
        assert_eq!(bundle_name(Path::new("app")), "app.bundle.js");
    }
}
