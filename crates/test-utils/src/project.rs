#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sitepipe::config::SiteConfig;
use sitepipe::reload::LiveReload;
use sitepipe::tasks::TaskContext;
use tempfile::TempDir;

/// A throwaway project directory on the real filesystem.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp project dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Write `contents` at `rel`, creating parent directories.
    pub fn write(&self, rel: &str, contents: &str) -> &Self {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, contents).expect("write project file");
        self
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).unwrap_or_else(|e| panic!("reading {rel}: {e}"))
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    /// Context rooted at this project with a fresh live-reload channel.
    pub fn ctx(&self, config: SiteConfig) -> TaskContext {
        self.ctx_with_reload(config, LiveReload::new())
    }

    pub fn ctx_with_reload(&self, config: SiteConfig, reload: LiveReload) -> TaskContext {
        TaskContext::new(self.root(), Arc::new(config), reload)
    }

    /// Every file under `rel`, keyed by its path relative to `rel`.
    pub fn snapshot(&self, rel: &str) -> BTreeMap<String, Vec<u8>> {
        let base = self.path(rel);
        let mut out = BTreeMap::new();
        let mut stack = vec![base.clone()];

        while let Some(dir) = stack.pop() {
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries {
                let path = entry.expect("dir entry").path();
                if path.is_dir() {
                    stack.push(path);
                } else {
                    let key = path
                        .strip_prefix(&base)
                        .expect("under base")
                        .to_string_lossy()
                        .replace('\\', "/");
                    out.insert(key, fs::read(&path).expect("read snapshot file"));
                }
            }
        }
        out
    }

    /// Names of the files directly inside `rel`, sorted.
    pub fn list(&self, rel: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path(rel))
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}
