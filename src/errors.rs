// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SitepipeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),

    #[error("Style compilation failed for {path}: {message}")]
    Style { path: String, message: String },

    #[error("Script build failed for {path}: {message}")]
    Script { path: String, message: String },

    #[error("Dev server error: {0}")]
    Server(String),

    #[error("Task '{0}' failed and on_error = \"abort\"")]
    Aborted(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SitepipeError>;
