// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `sitepipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sitepipe",
    version,
    about = "Build, watch and serve the assets of a static site.",
    long_about = None
)]
pub struct CliArgs {
    /// What to run. Defaults to `dev`.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the config file (TOML).
    ///
    /// The file is optional; built-in defaults are used when it is missing.
    #[arg(long, global = true, value_name = "PATH", default_value = "Sitepipe.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SITEPIPE_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Don't open a browser window when the dev server starts.
    #[arg(long, global = true)]
    pub no_open: bool,

    /// Override `[server].port`.
    #[arg(long, global = true, value_name = "PORT")]
    pub port: Option<u16>,

    /// Load + validate the config, print it, but don't run anything.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// After a single-task command, keep watching that task's sources.
    #[arg(long, global = true)]
    pub watch: bool,
}

impl CliArgs {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Dev)
    }
}

/// Named entry points of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Clean, build everything, then watch sources and serve `dist/`.
    Dev,
    /// Clean and build everything once; no watcher, no server.
    Build,
    /// Remove everything under the distribution root.
    Clean,
    /// Compile stylesheets only.
    Style,
    /// Minify markup only.
    Markup,
    /// Bundle, transpile and minify scripts only.
    Script,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_dev() {
        let args = CliArgs::try_parse_from(["sitepipe"]).unwrap();
        assert_eq!(args.command(), Command::Dev);
        assert_eq!(args.config, "Sitepipe.toml");
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args =
            CliArgs::try_parse_from(["sitepipe", "build", "--config", "site/Sitepipe.toml"])
                .unwrap();
        assert_eq!(args.command(), Command::Build);
        assert_eq!(args.config, "site/Sitepipe.toml");
    }

    #[test]
    fn single_task_with_watch() {
        let args = CliArgs::try_parse_from(["sitepipe", "script", "--watch"]).unwrap();
        assert_eq!(args.command(), Command::Script);
        assert!(args.watch);
        assert!(!args.no_open);
    }
}
