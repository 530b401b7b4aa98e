// src/config/model.rs

use serde::Deserialize;

use crate::types::{ErrorPolicy, OutputStyle, ScriptTarget};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// on_error = "log"
///
/// [paths]
/// src = "src/"
/// dist = "dist/"
///
/// [style]
/// input = "src/sass/**/*.scss"
/// out = "dist/css/"
/// browsers = ["last 2 versions", "> 2%"]
///
/// [server]
/// index = "parsed/index.html"
/// port = 3000
/// ```
///
/// All sections are optional; an empty file (or no file at all) yields the
/// stock layout `src/{sass,views,scripts}` -> `dist/{css,parsed,es5}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSiteConfig {
    #[serde(default)]
    pub config: ConfigSection,
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub style: StyleSection,
    #[serde(default)]
    pub markup: MarkupSection,
    #[serde(default)]
    pub script: ScriptSection,
    #[serde(default)]
    pub server: ServerSection,
}

/// Validated configuration.
///
/// Only obtainable through `SiteConfig::try_from(RawSiteConfig)` (see
/// `validate.rs`) so the rest of the crate can rely on globs compiling and
/// output directories being distinct.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub config: ConfigSection,
    pub paths: PathsSection,
    pub style: StyleSection,
    pub markup: MarkupSection,
    pub script: ScriptSection,
    pub server: ServerSection,
}

impl SiteConfig {
    pub(crate) fn new_unchecked(raw: RawSiteConfig) -> Self {
        Self {
            config: raw.config,
            paths: raw.paths,
            style: raw.style,
            markup: raw.markup,
            script: raw.script,
            server: raw.server,
        }
    }
}

/// `[config]` section: global behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConfigSection {
    /// `"log"` (default) or `"abort"`.
    pub on_error: ErrorPolicy,

    /// How many re-runs of a single task to remember while it is running.
    pub queue_length: usize,
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            on_error: ErrorPolicy::Log,
            queue_length: 1,
        }
    }
}

/// `[paths]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    /// Source root; this is what the watcher observes.
    pub src: String,
    /// Distribution root; everything below it is deleted by `clean`.
    pub dist: String,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            src: "src/".to_string(),
            dist: "dist/".to_string(),
        }
    }
}

/// `[style]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleSection {
    pub input: String,
    pub out: String,
    pub output_style: OutputStyle,
    /// Browserslist queries used for vendor prefixing.
    pub browsers: Vec<String>,
    pub source_maps: bool,
    pub watch: String,
}

impl Default for StyleSection {
    fn default() -> Self {
        Self {
            input: "src/sass/**/*.scss".to_string(),
            out: "dist/css/".to_string(),
            output_style: OutputStyle::Compressed,
            browsers: vec!["last 2 versions".to_string(), "> 2%".to_string()],
            source_maps: true,
            watch: "src/sass/**/*".to_string(),
        }
    }
}

/// `[markup]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarkupSection {
    pub input: String,
    pub out: String,
    pub collapse_whitespace: bool,
    pub watch: String,
}

impl Default for MarkupSection {
    fn default() -> Self {
        Self {
            input: "src/views/**/*.html".to_string(),
            out: "dist/parsed".to_string(),
            collapse_whitespace: true,
            watch: "src/views/**/*".to_string(),
        }
    }
}

/// `[script]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScriptSection {
    /// Every file matching this glob is an independent bundle entry.
    pub input: String,
    pub out: String,
    /// Replaces the `.js` extension of each entry, e.g. `app.js` -> `app.min.js`.
    pub suffix: String,
    pub target: ScriptTarget,
    pub minify: bool,
    pub source_maps: bool,
    pub watch: String,
}

impl Default for ScriptSection {
    fn default() -> Self {
        Self {
            input: "src/scripts/**/*.js".to_string(),
            out: "dist/es5/".to_string(),
            suffix: ".min.js".to_string(),
            target: ScriptTarget::Es5,
            minify: true,
            source_maps: true,
            watch: "src/scripts/**/*".to_string(),
        }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub base_dir: String,
    /// Document served for `/`, relative to `base_dir`.
    pub index: String,
    pub host: String,
    pub port: u16,
    /// Open a browser window once the server is listening.
    pub open: bool,
    /// Show an in-page notice whenever the browser is refreshed.
    pub notify: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            base_dir: "dist/".to_string(),
            index: "parsed/index.html".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            open: true,
            notify: true,
        }
    }
}
