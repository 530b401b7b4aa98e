// src/config/validate.rs

use std::path::{Component, Path};

use globset::Glob;
use lightningcss::targets::Browsers;

use crate::config::model::{RawSiteConfig, SiteConfig};
use crate::errors::{Result, SitepipeError};

impl TryFrom<RawSiteConfig> for SiteConfig {
    type Error = crate::errors::SitepipeError;

    fn try_from(raw: RawSiteConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(SiteConfig::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawSiteConfig) -> Result<()> {
    validate_global_config(cfg)?;
    validate_globs(cfg)?;
    validate_outputs(cfg)?;
    validate_script(cfg)?;
    validate_server(cfg)?;
    validate_browsers(cfg)?;
    Ok(())
}

fn validate_global_config(cfg: &RawSiteConfig) -> Result<()> {
    if cfg.config.queue_length == 0 {
        return Err(SitepipeError::Config(
            "[config].queue_length must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_globs(cfg: &RawSiteConfig) -> Result<()> {
    let patterns = [
        ("style.input", &cfg.style.input),
        ("style.watch", &cfg.style.watch),
        ("markup.input", &cfg.markup.input),
        ("markup.watch", &cfg.markup.watch),
        ("script.input", &cfg.script.input),
        ("script.watch", &cfg.script.watch),
    ];

    for (key, pattern) in patterns {
        if pattern.trim().is_empty() {
            return Err(SitepipeError::Config(format!("{key} must not be empty")));
        }
        Glob::new(pattern)
            .map_err(|e| SitepipeError::Config(format!("{key}: invalid glob {pattern:?}: {e}")))?;
    }
    Ok(())
}

fn validate_outputs(cfg: &RawSiteConfig) -> Result<()> {
    let outs = [
        ("style.out", normalize_dir(&cfg.style.out)),
        ("markup.out", normalize_dir(&cfg.markup.out)),
        ("script.out", normalize_dir(&cfg.script.out)),
    ];

    for (i, (key_a, a)) in outs.iter().enumerate() {
        for (key_b, b) in outs.iter().skip(i + 1) {
            if a == b {
                return Err(SitepipeError::Config(format!(
                    "{key_a} and {key_b} both point to '{a}'; each asset class needs its own output directory"
                )));
            }
        }
    }

    validate_dist(&cfg.paths.dist, &cfg.paths.src)
}

/// `clean` deletes everything below dist, so it has to be a strict
/// subdirectory of the project that does not hold the sources.
fn validate_dist(dist: &str, src: &str) -> Result<()> {
    let dist_n = normalize_dir(dist);
    let dist_path = Path::new(&dist_n);

    for component in dist_path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(SitepipeError::Config(format!(
                    "[paths].dist must stay inside the project (got {dist:?})"
                )));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(SitepipeError::Config(format!(
                    "[paths].dist must be relative to the project root (got {dist:?})"
                )));
            }
        }
    }

    if !dist_path
        .components()
        .any(|c| matches!(c, Component::Normal(_)))
    {
        return Err(SitepipeError::Config(
            "[paths].dist must not be the project root".to_string(),
        ));
    }

    let src_n = normalize_dir(src);
    if Path::new(&src_n).starts_with(dist_path) {
        return Err(SitepipeError::Config(format!(
            "[paths].dist ({dist:?}) must not contain [paths].src ({src:?})"
        )));
    }
    Ok(())
}

fn validate_script(cfg: &RawSiteConfig) -> Result<()> {
    let suffix = &cfg.script.suffix;
    if suffix == ".js" || !suffix.ends_with(".js") {
        return Err(SitepipeError::Config(format!(
            "[script].suffix must end in \".js\" and differ from it (got {suffix:?})"
        )));
    }
    Ok(())
}

fn validate_server(cfg: &RawSiteConfig) -> Result<()> {
    let index = &cfg.server.index;
    if index.is_empty() || Path::new(index).is_absolute() || index.starts_with('/') {
        return Err(SitepipeError::Config(format!(
            "[server].index must be a path relative to base_dir (got {index:?})"
        )));
    }
    Ok(())
}

fn validate_browsers(cfg: &RawSiteConfig) -> Result<()> {
    Browsers::from_browserslist(cfg.style.browsers.iter()).map_err(|e| {
        SitepipeError::Config(format!(
            "[style].browsers is not a valid browserslist query: {e}"
        ))
    })?;
    Ok(())
}

/// `"./dist/css/"` and `"dist/css"` name the same directory.
pub(crate) fn normalize_dir(dir: &str) -> String {
    let dir = dir.trim().replace('\\', "/");
    let dir = dir.trim_start_matches("./");
    dir.trim_end_matches('/').to_string()
}
