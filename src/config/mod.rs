// src/config/mod.rs

//! Configuration loading and validation for sitepipe.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate globs, output layout and browser queries (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, project_root};
pub use model::{
    ConfigSection, MarkupSection, PathsSection, RawSiteConfig, ScriptSection, ServerSection,
    SiteConfig, StyleSection,
};
