use std::fmt;

use serde::Deserialize;

/// What to do when a single file fails to compile.
///
/// - `Log`: report the error, skip that file and keep the task (and the
///   process) alive. This is the default.
/// - `Abort`: fail the whole task and stop the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    #[default]
    Log,
    Abort,
}

/// Output formatting of compiled stylesheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    #[default]
    Compressed,
    Expanded,
}

/// ECMAScript version emitted by the script task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptTarget {
    Es3,
    #[default]
    Es5,
    Es2015,
    Es2016,
    Es2017,
    Es2018,
    Es2019,
    Es2020,
    Es2021,
    Es2022,
}

impl ScriptTarget {
    pub fn to_es_version(self) -> swc_ecma_ast::EsVersion {
        use swc_ecma_ast::EsVersion;
        match self {
            ScriptTarget::Es3 => EsVersion::Es3,
            ScriptTarget::Es5 => EsVersion::Es5,
            ScriptTarget::Es2015 => EsVersion::Es2015,
            ScriptTarget::Es2016 => EsVersion::Es2016,
            ScriptTarget::Es2017 => EsVersion::Es2017,
            ScriptTarget::Es2018 => EsVersion::Es2018,
            ScriptTarget::Es2019 => EsVersion::Es2019,
            ScriptTarget::Es2020 => EsVersion::Es2020,
            ScriptTarget::Es2021 => EsVersion::Es2021,
            ScriptTarget::Es2022 => EsVersion::Es2022,
        }
    }
}

/// The pipeline tasks that can be scheduled by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    Clean,
    Style,
    Markup,
    Script,
}

impl TaskKind {
    /// Tasks that own a source tree and are re-run by the watcher.
    pub const WATCHED: [TaskKind; 3] = [TaskKind::Style, TaskKind::Markup, TaskKind::Script];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Clean => "clean",
            TaskKind::Style => "style",
            TaskKind::Markup => "markup",
            TaskKind::Script => "script",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Policy {
        on_error: ErrorPolicy,
    }

    #[test]
    fn error_policy_comes_from_toml() {
        let parsed: Policy = toml::from_str("on_error = \"abort\"").unwrap();
        assert_eq!(parsed.on_error, ErrorPolicy::Abort);
        assert!(toml::from_str::<Policy>("on_error = \"ignore\"").is_err());
    }
}
