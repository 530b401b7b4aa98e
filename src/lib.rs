// src/lib.rs

pub mod cli;
pub mod config;
pub mod discover;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod reload;
pub mod server;
pub mod tasks;
pub mod types;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::{SiteConfig, load_and_validate, project_root};
use crate::reload::LiveReload;
use crate::tasks::TaskContext;
use crate::types::TaskKind;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - the task context (root, filesystem, live-reload channel)
/// - the selected command
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let mut cfg = load_and_validate(&config_path)?;

    if let Some(port) = args.port {
        cfg.server.port = port;
    }
    if args.no_open {
        cfg.server.open = false;
    }

    let command = args.command();

    if args.dry_run {
        print_dry_run(command, &cfg);
        return Ok(());
    }

    let root = project_root(&config_path);
    info!(?root, ?command, "starting sitepipe");
    let ctx = TaskContext::new(root, Arc::new(cfg), LiveReload::new());

    match command {
        Command::Dev => pipeline::dev(&ctx).await?,
        Command::Build => {
            pipeline::build(&ctx).await?;
        }
        Command::Clean => {
            pipeline::single(&ctx, TaskKind::Clean, false).await?;
        }
        Command::Style => {
            pipeline::single(&ctx, TaskKind::Style, args.watch).await?;
        }
        Command::Markup => {
            pipeline::single(&ctx, TaskKind::Markup, args.watch).await?;
        }
        Command::Script => {
            pipeline::single(&ctx, TaskKind::Script, args.watch).await?;
        }
    }

    Ok(())
}

/// Simple dry-run output: print the resolved configuration.
fn print_dry_run(command: Command, cfg: &SiteConfig) {
    println!("sitepipe dry-run ({command:?})");
    println!("  config.on_error = {:?}", cfg.config.on_error);
    println!("  config.queue_length = {}", cfg.config.queue_length);
    println!("  paths: src = {}, dist = {}", cfg.paths.src, cfg.paths.dist);
    println!();

    println!("style:");
    println!("    {} -> {}", cfg.style.input, cfg.style.out);
    println!("    output_style: {:?}", cfg.style.output_style);
    println!("    browsers: {:?}", cfg.style.browsers);
    println!("    source_maps: {}", cfg.style.source_maps);
    println!("    watch: {}", cfg.style.watch);

    println!("markup:");
    println!("    {} -> {}", cfg.markup.input, cfg.markup.out);
    println!("    collapse_whitespace: {}", cfg.markup.collapse_whitespace);
    println!("    watch: {}", cfg.markup.watch);

    println!("script:");
    println!("    {} -> {}", cfg.script.input, cfg.script.out);
    println!("    suffix: {}", cfg.script.suffix);
    println!("    target: {:?}", cfg.script.target);
    println!("    minify: {}", cfg.script.minify);
    println!("    source_maps: {}", cfg.script.source_maps);
    println!("    watch: {}", cfg.script.watch);

    println!("server:");
    println!(
        "    http://{}:{}/ -> {}{}",
        cfg.server.host, cfg.server.port, cfg.server.base_dir, cfg.server.index
    );
    println!("    open: {}, notify: {}", cfg.server.open, cfg.server.notify);

    debug!("dry-run complete (no execution)");
}
