// tests/script_entries.rs

mod common;
use crate::common::{SiteConfigBuilder, TestProject, init_tracing, sample_site};

use std::error::Error;

use sitepipe::errors::SitepipeError;
use sitepipe::tasks::run_task;
use sitepipe::types::{ErrorPolicy, ScriptTarget, TaskKind};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn one_bundle_per_entry() -> TestResult {
    init_tracing();
    let project = sample_site();
    let ctx = project.ctx(SiteConfigBuilder::new().script_input("src/scripts/*.js").build());

    let report = run_task(TaskKind::Script, &ctx).await?;

    assert_eq!(report.processed, 2);
    assert_eq!(
        project.list("dist/es5"),
        vec!["admin.min.js", "admin.min.js.map", "app.min.js", "app.min.js.map"]
    );
    Ok(())
}

#[tokio::test]
async fn bundles_are_downleveled_to_es5() -> TestResult {
    init_tracing();
    let project = sample_site();
    let ctx = project.ctx(
        SiteConfigBuilder::new()
            .script_input("src/scripts/*.js")
            .script_target(ScriptTarget::Es5)
            .build(),
    );

    run_task(TaskKind::Script, &ctx).await?;

    let app = project.read("dist/es5/app.min.js");
    assert!(!app.contains("=>"), "arrow function survived: {app}");
    assert!(!app.contains('`'), "template literal survived: {app}");
    assert!(!app.contains("const "), "const survived: {app}");
    assert!(app.contains("hello "), "shared module missing: {app}");
    assert!(app.trim_end().ends_with("//# sourceMappingURL=app.min.js.map"));

    let map: serde_json::Value = serde_json::from_str(&project.read("dist/es5/app.min.js.map"))?;
    assert_eq!(map["version"], 3);
    Ok(())
}

#[tokio::test]
async fn custom_suffix_without_maps() -> TestResult {
    init_tracing();
    let project = sample_site();
    let ctx = project.ctx(
        SiteConfigBuilder::new()
            .script_input("src/scripts/*.js")
            .script_suffix(".bundle.js")
            .source_maps(false)
            .script_minify(false)
            .build(),
    );

    run_task(TaskKind::Script, &ctx).await?;

    assert_eq!(
        project.list("dist/es5"),
        vec!["admin.bundle.js", "app.bundle.js"]
    );
    assert!(!project.read("dist/es5/app.bundle.js").contains("sourceMappingURL"));
    Ok(())
}

#[tokio::test]
async fn broken_entry_does_not_stop_the_others() -> TestResult {
    init_tracing();
    let project = TestProject::new();
    project
        .write("src/scripts/ok.js", "console.log('ok');\n")
        .write("src/scripts/syntax.js", "var = ;\n")
        .write("src/scripts/missing.js", "require('./nope');\n");
    let ctx = project.ctx(SiteConfigBuilder::new().on_error(ErrorPolicy::Log).build());

    let report = run_task(TaskKind::Script, &ctx).await?;

    assert_eq!(report.processed, 1);
    assert_eq!(report.failed, 2);
    assert_eq!(project.list("dist/es5"), vec!["ok.min.js", "ok.min.js.map"]);
    Ok(())
}

#[tokio::test]
async fn abort_still_finishes_healthy_entries() -> TestResult {
    init_tracing();
    let project = TestProject::new();
    project
        .write("src/scripts/ok.js", "console.log('ok');\n")
        .write("src/scripts/missing.js", "require('./nope');\n");
    let ctx = project.ctx(SiteConfigBuilder::new().on_error(ErrorPolicy::Abort).build());

    let err = run_task(TaskKind::Script, &ctx).await.unwrap_err();
    match err {
        SitepipeError::Script { path, message } => {
            assert_eq!(path, "missing.js");
            assert!(message.contains("cannot resolve './nope'"), "got: {message}");
        }
        other => panic!("expected a script error, got {other:?}"),
    }
    assert!(project.exists("dist/es5/ok.min.js"));
    Ok(())
}

#[tokio::test]
async fn no_entries_is_an_empty_run() -> TestResult {
    init_tracing();
    let project = TestProject::new();
    let ctx = project.ctx(SiteConfigBuilder::new().build());

    let report = run_task(TaskKind::Script, &ctx).await?;
    assert_eq!(report.processed, 0);
    assert!(!project.exists("dist/es5"));
    Ok(())
}

#[tokio::test]
async fn es_module_entries_are_bundled() -> TestResult {
    init_tracing();
    let project = TestProject::new();
    project
        .write(
            "src/scripts/app.js",
            "import greet from './lib/greet';\nimport { loud } from './lib/loud.js';\ndocument.title = loud(greet('esm'));\n",
        )
        .write(
            "src/scripts/lib/greet.js",
            "module.exports = (name) => `hello ${name}`;\n",
        )
        .write(
            "src/scripts/lib/loud.js",
            "export function loud(s) { return s.toUpperCase(); }\n",
        );
    let ctx = project.ctx(
        SiteConfigBuilder::new()
            .script_input("src/scripts/*.js")
            .script_minify(false)
            .build(),
    );

    let report = run_task(TaskKind::Script, &ctx).await?;
    assert_eq!(report.processed, 1);
    assert_eq!(report.failed, 0);

    let app = project.read("dist/es5/app.min.js");
    assert!(!app.contains("import "), "import survived: {app}");
    assert!(app.contains("toUpperCase"), "lib/loud missing: {app}");
    assert!(app.contains("hello "), "lib/greet missing: {app}");
    Ok(())
}

#[tokio::test]
async fn packages_are_pulled_from_node_modules() -> TestResult {
    init_tracing();
    let project = TestProject::new();
    project
        .write(
            "src/scripts/app.js",
            "var pad = require('pad-left');\nconsole.log(pad('7', 3));\n",
        )
        .write(
            "node_modules/pad-left/package.json",
            r#"{ "name": "pad-left", "main": "./dist/pad.js" }"#,
        )
        .write(
            "node_modules/pad-left/dist/pad.js",
            "module.exports = function padLeftImpl(s, n) { while (s.length < n) s = '0' + s; return s; };\n",
        );
    let ctx = project.ctx(
        SiteConfigBuilder::new()
            .script_input("src/scripts/*.js")
            .script_minify(false)
            .build(),
    );

    let report = run_task(TaskKind::Script, &ctx).await?;
    assert_eq!(report.processed, 1);
    assert!(project.read("dist/es5/app.min.js").contains("padLeftImpl"));
    Ok(())
}

#[tokio::test]
async fn commented_out_requires_do_not_break_the_entry() -> TestResult {
    init_tracing();
    let project = TestProject::new();
    project.write(
        "src/scripts/app.js",
        "// var old = require('./removed');\nvar msg = \"call require('./nope') later\";\nconsole.log(msg);\n",
    );
    let ctx = project.ctx(SiteConfigBuilder::new().on_error(ErrorPolicy::Abort).build());

    let report = run_task(TaskKind::Script, &ctx).await?;
    assert_eq!(report.processed, 1);
    Ok(())
}

#[tokio::test]
async fn script_maps_name_the_bundle() -> TestResult {
    init_tracing();
    let project = sample_site();
    let ctx = project.ctx(SiteConfigBuilder::new().script_input("src/scripts/*.js").build());

    run_task(TaskKind::Script, &ctx).await?;

    let map: serde_json::Value = serde_json::from_str(&project.read("dist/es5/app.min.js.map"))?;
    assert_eq!(map["sources"][0], "app.bundle.js");
    Ok(())
}
