// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::config::SiteConfig;
use crate::config::validate::normalize_dir;
use crate::types::TaskKind;

/// Compiled watch/exclude glob patterns for a single task.
///
/// The patterns are relative to the project root. The watcher passes
/// relative paths (e.g. `"src/sass/main.scss"`) into `matches`.
#[derive(Clone)]
pub struct TaskWatchProfile {
    task: TaskKind,
    watch_set: GlobSet,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for TaskWatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskWatchProfile")
            .field("task", &self.task)
            .finish_non_exhaustive()
    }
}

impl TaskWatchProfile {
    pub fn new(task: TaskKind, watch: &[String], exclude: &[String]) -> Result<Self> {
        let watch_set = build_globset(watch)
            .with_context(|| format!("building watch globset for task {task}"))?;

        let exclude_set = if exclude.is_empty() {
            None
        } else {
            Some(
                build_globset(exclude)
                    .with_context(|| format!("building exclude globset for task {task}"))?,
            )
        };

        Ok(Self {
            task,
            watch_set,
            exclude_set,
        })
    }

    /// Task this profile re-triggers.
    pub fn task(&self) -> TaskKind {
        self.task
    }

    /// Returns true if this task is interested in the given path (relative to
    /// the project root), e.g. `"src/views/index.html"`.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.watch_set.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// One profile per watched task, from `[style|markup|script].watch`.
///
/// Everything below `[paths].dist` is excluded so task outputs never
/// re-trigger tasks, even when a watch glob is broad.
pub fn build_profiles_from_config(cfg: &SiteConfig) -> Result<Vec<TaskWatchProfile>> {
    let exclude = vec![format!("{}/**", normalize_dir(&cfg.paths.dist))];

    [
        (TaskKind::Style, &cfg.style.watch),
        (TaskKind::Markup, &cfg.markup.watch),
        (TaskKind::Script, &cfg.script.watch),
    ]
    .into_iter()
    .map(|(task, watch)| TaskWatchProfile::new(task, &[normalize_glob(watch)], &exclude))
    .collect()
}

/// Drop a leading `./` so globs line up with relativized event paths.
fn normalize_glob(pattern: &str) -> String {
    pattern.trim().trim_start_matches("./").to_string()
}

/// Build a GlobSet where `*` does not cross `/`.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawSiteConfig;

    fn profiles() -> Vec<TaskWatchProfile> {
        let cfg = SiteConfig::try_from(RawSiteConfig::default()).unwrap();
        build_profiles_from_config(&cfg).unwrap()
    }

    fn matching(rel: &str) -> Vec<TaskKind> {
        profiles()
            .iter()
            .filter(|p| p.matches(rel))
            .map(|p| p.task())
            .collect()
    }

    #[test]
    fn each_source_tree_maps_to_its_task() {
        assert_eq!(matching("src/sass/_vars.scss"), vec![TaskKind::Style]);
        assert_eq!(matching("src/views/index.html"), vec![TaskKind::Markup]);
        assert_eq!(matching("src/scripts/lib/util.js"), vec![TaskKind::Script]);
        assert!(matching("README.md").is_empty());
    }

    #[test]
    fn every_watched_task_gets_a_profile() {
        let tasks: Vec<TaskKind> = profiles().iter().map(|p| p.task()).collect();
        assert_eq!(tasks, TaskKind::WATCHED.to_vec());
    }

    #[test]
    fn outputs_never_match() {
        let profile = TaskWatchProfile::new(
            TaskKind::Script,
            &["**/*.js".to_string()],
            &["dist/**".to_string()],
        )
        .unwrap();
        assert!(profile.matches("src/app.js"));
        assert!(!profile.matches("dist/es5/app.min.js"));
    }
}
