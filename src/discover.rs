// src/discover.rs

//! Synchronous source discovery.
//!
//! Each task expands its input glob exactly once, at the start of a run, into
//! an immutable sorted list. Files created while a run is in flight are picked
//! up by the next run.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};

use crate::fs::FileSystem;

/// A source file found by [`discover`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    /// Path on disk (`root` joined with the root-relative path).
    pub path: PathBuf,
    /// Path relative to the glob base; this is what lands under the output dir.
    pub rel: PathBuf,
}

/// Compile a glob the way node-style globs behave: `*` stops at `/`.
pub fn compile_glob(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid glob pattern: {pattern}"))?;
    Ok(glob.compile_matcher())
}

/// Literal directory prefix of a glob.
///
/// `"src/sass/**/*.scss"` -> `"src/sass"`, `"src/*.js"` -> `"src"`,
/// `"*.js"` -> `""`.
pub fn glob_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    let components: Vec<&str> = pattern.split('/').collect();

    // The last component is a file pattern even when it has no metacharacters.
    for part in &components[..components.len().saturating_sub(1)] {
        if part.chars().any(|c| matches!(c, '*' | '?' | '[' | '{')) {
            break;
        }
        if !part.is_empty() && *part != "." {
            base.push(part);
        }
    }
    base
}

/// Expand `pattern` (relative to `root`) into the files currently on disk.
///
/// A missing base directory yields an empty list rather than an error.
pub fn discover(fs: &dyn FileSystem, root: &Path, pattern: &str) -> Result<Vec<SourceFile>> {
    // Candidates are matched as `src/...`, never `./src/...`.
    let pattern = pattern.trim_start_matches("./");
    let matcher = compile_glob(pattern)?;
    let base = glob_base(pattern);
    let start = root.join(&base);

    if !fs.is_dir(&start) {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    let mut stack = vec![start];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                let Ok(rel_to_root) = path.strip_prefix(root) else {
                    continue;
                };
                let rel_str = slash_path(rel_to_root);
                if matcher.is_match(&rel_str) {
                    let rel = rel_to_root
                        .strip_prefix(&base)
                        .unwrap_or(rel_to_root)
                        .to_path_buf();
                    found.push(SourceFile { path, rel });
                }
            }
        }
    }

    found.sort();
    Ok(found)
}

/// Forward-slash string form of a relative path, without `./` components.
pub fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
