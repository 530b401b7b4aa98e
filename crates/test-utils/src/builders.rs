#![allow(dead_code)]

use sitepipe::config::{RawSiteConfig, SiteConfig};
use sitepipe::types::{ErrorPolicy, OutputStyle, ScriptTarget};

/// Builder for `SiteConfig` to simplify test setup.
///
/// Starts from the stock layout with the browser launch turned off.
pub struct SiteConfigBuilder {
    config: RawSiteConfig,
}

impl SiteConfigBuilder {
    pub fn new() -> Self {
        let mut config = RawSiteConfig::default();
        config.server.open = false;
        Self { config }
    }

    pub fn on_error(mut self, policy: ErrorPolicy) -> Self {
        self.config.config.on_error = policy;
        self
    }

    pub fn queue_length(mut self, n: usize) -> Self {
        self.config.config.queue_length = n;
        self
    }

    pub fn output_style(mut self, style: OutputStyle) -> Self {
        self.config.style.output_style = style;
        self
    }

    pub fn browsers(mut self, queries: &[&str]) -> Self {
        self.config.style.browsers = queries.iter().map(|q| q.to_string()).collect();
        self
    }

    /// Toggle source maps for both styles and scripts.
    pub fn source_maps(mut self, on: bool) -> Self {
        self.config.style.source_maps = on;
        self.config.script.source_maps = on;
        self
    }

    pub fn collapse_whitespace(mut self, on: bool) -> Self {
        self.config.markup.collapse_whitespace = on;
        self
    }

    pub fn script_suffix(mut self, suffix: &str) -> Self {
        self.config.script.suffix = suffix.to_string();
        self
    }

    pub fn script_target(mut self, target: ScriptTarget) -> Self {
        self.config.script.target = target;
        self
    }

    pub fn script_minify(mut self, on: bool) -> Self {
        self.config.script.minify = on;
        self
    }

    pub fn script_input(mut self, pattern: &str) -> Self {
        self.config.script.input = pattern.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn raw(self) -> RawSiteConfig {
        self.config
    }

    pub fn build(self) -> SiteConfig {
        SiteConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for SiteConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
