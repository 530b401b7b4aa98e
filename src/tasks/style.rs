// src/tasks/style.rs

//! SCSS -> CSS.
//!
//! Each non-partial stylesheet is compiled with grass, then parsed again by
//! lightningcss which adds vendor prefixes for `[style].browsers`, optionally
//! minifies, and produces the source map. Output lands at
//! `<style.out>/<rel>.css` next to a `.css.map` sidecar.

use std::path::Path;

use codemap::SpanLoc;
use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use parcel_sourcemap::SourceMap;
use tracing::{debug, warn};

use crate::discover::{SourceFile, discover, slash_path};
use crate::errors::{Result, SitepipeError};
use crate::reload::ReloadEvent;
use crate::tasks::{TaskContext, TaskReport};
use crate::types::{OutputStyle, TaskKind};

/// Compiled stylesheet ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledCss {
    pub css: String,
    pub map: Option<String>,
}

pub fn run(ctx: &TaskContext) -> Result<TaskReport> {
    let cfg = &ctx.config.style;
    let out_dir = ctx.resolve(&cfg.out);
    let targets = browser_targets(&cfg.browsers)?;

    let mut report = TaskReport::default();

    for source in discover(ctx.fs.as_ref(), &ctx.root, &cfg.input)? {
        if is_partial(&source.path) {
            debug!(path = ?source.rel, "skipping partial");
            continue;
        }

        match build_one(ctx, &source, targets) {
            Ok(compiled) => {
                let written = write_output(ctx, &out_dir, &source, compiled)?;
                report.processed += 1;

                let event = match ctx.served_path(&written) {
                    Some(path) => ReloadEvent::Css { path },
                    None => ReloadEvent::Reload,
                };
                ctx.reload.send(event);
            }
            Err(err) => ctx.record_failure(TaskKind::Style, &mut report, err)?,
        }
    }

    Ok(report)
}

/// Files whose name starts with `_` are only meant to be `@use`d/`@import`ed.
pub fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}

fn browser_targets(queries: &[String]) -> Result<Targets> {
    let browsers = Browsers::from_browserslist(queries.iter())
        .map_err(|e| SitepipeError::Config(format!("[style].browsers: {e}")))?;
    Ok(Targets {
        browsers,
        ..Targets::default()
    })
}

fn build_one(ctx: &TaskContext, source: &SourceFile, targets: Targets) -> Result<CompiledCss> {
    let cfg = &ctx.config.style;
    let name = slash_path(&source.rel);

    let css = compile_scss(&source.path, cfg.output_style).map_err(|message| {
        SitepipeError::Style {
            path: name.clone(),
            message,
        }
    })?;

    postprocess(&css, &intermediate_name(&name), cfg.output_style, targets, cfg.source_maps).map_err(|message| {
        SitepipeError::Style {
            path: name.clone(),
            message,
        }
    })
}

/// Run grass over one stylesheet. Imports resolve against the file's own
/// directory and diagnostics carry its path.
pub fn compile_scss(path: &Path, style: OutputStyle) -> std::result::Result<String, String> {
    let style = match style {
        OutputStyle::Compressed => grass::OutputStyle::Compressed,
        OutputStyle::Expanded => grass::OutputStyle::Expanded,
    };

    let options = grass::Options::default()
        .style(style)
        .quiet(false)
        .logger(&ScssLogger {});

    grass::from_path(path, &options).map_err(|e| e.to_string())
}

/// Name of grass's CSS output in the source map. The map points into that
/// CSS, not back into the SCSS, so it is not labelled as the `.scss` file.
pub fn intermediate_name(scss_name: &str) -> String {
    format!("{scss_name}.css")
}

/// Prefix (and, for compressed output, minify) plain CSS.
pub fn postprocess(
    css: &str,
    filename: &str,
    style: OutputStyle,
    targets: Targets,
    source_maps: bool,
) -> std::result::Result<CompiledCss, String> {
    let mut stylesheet = StyleSheet::parse(
        css,
        ParserOptions {
            filename: filename.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| e.to_string())?;

    stylesheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| e.to_string())?;

    let mut source_map = if source_maps {
        let mut sm = SourceMap::new("/");
        sm.add_source(filename);
        sm.set_source_content(0, css)
            .map_err(|e| format!("{e:?}"))?;
        Some(sm)
    } else {
        None
    };

    let printed = stylesheet
        .to_css(PrinterOptions {
            minify: style == OutputStyle::Compressed,
            source_map: source_map.as_mut(),
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;

    let map = match source_map.as_mut() {
        Some(sm) => Some(sm.to_json(None).map_err(|e| format!("{e:?}"))?),
        None => None,
    };

    Ok(CompiledCss {
        css: printed.code,
        map,
    })
}

fn write_output(
    ctx: &TaskContext,
    out_dir: &Path,
    source: &SourceFile,
    compiled: CompiledCss,
) -> Result<std::path::PathBuf> {
    let target = out_dir.join(&source.rel).with_extension("css");
    let mut css = compiled.css;

    if let Some(map) = compiled.map {
        let map_path = target.with_extension("css.map");
        let map_name = map_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        css.push_str(&format!("\n/*# sourceMappingURL={map_name} */\n"));
        ctx.fs.write(&map_path, map.as_bytes())?;
    }

    ctx.fs.write(&target, css.as_bytes())?;
    debug!(?target, "wrote stylesheet");
    Ok(target)
}

/// Routes grass `@debug`/`@warn` output through tracing.
#[derive(Debug)]
pub struct ScssLogger {}

impl grass::Logger for ScssLogger {
    fn debug(&self, location: SpanLoc, message: &str) {
        debug!(
            "{}:{} DEBUG: {}",
            location.file.name(),
            location.begin.line + 1,
            message
        );
    }

    fn warn(&self, location: SpanLoc, message: &str) {
        warn!(
            "Warning: {}\n    ./{}:{}:{}",
            message,
            location.file.name(),
            location.begin.line + 1,
            location.begin.column + 1
        );
    }
}
