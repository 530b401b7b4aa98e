// tests/style_errors.rs

mod common;
use crate::common::{SiteConfigBuilder, TestProject, init_tracing};

use std::error::Error;

use sitepipe::errors::SitepipeError;
use sitepipe::tasks::run_task;
use sitepipe::types::{ErrorPolicy, OutputStyle, TaskKind};

type TestResult = Result<(), Box<dyn Error>>;

fn broken_and_good() -> TestProject {
    let project = TestProject::new();
    project
        .write("src/sass/broken.scss", ".a { color: $undefined; }\n")
        .write("src/sass/good.scss", "$c: red;\n.b { color: $c; }\n");
    project
}

#[tokio::test]
async fn log_policy_skips_the_broken_file() -> TestResult {
    init_tracing();
    let project = broken_and_good();
    let ctx = project.ctx(SiteConfigBuilder::new().on_error(ErrorPolicy::Log).build());

    let report = run_task(TaskKind::Style, &ctx).await?;

    assert_eq!(report.processed, 1);
    assert_eq!(report.failed, 1);
    assert!(!report.is_success());
    assert!(project.exists("dist/css/good.css"));
    assert!(!project.exists("dist/css/broken.css"));
    Ok(())
}

#[tokio::test]
async fn abort_policy_surfaces_the_error() -> TestResult {
    init_tracing();
    let project = broken_and_good();
    let ctx = project.ctx(SiteConfigBuilder::new().on_error(ErrorPolicy::Abort).build());

    let err = run_task(TaskKind::Style, &ctx).await.unwrap_err();
    match err {
        SitepipeError::Style { path, message } => {
            assert_eq!(path, "broken.scss");
            assert!(message.contains("Undefined variable"), "got: {message}");
        }
        other => panic!("expected a style error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn nested_sources_keep_their_directories() -> TestResult {
    init_tracing();
    let project = TestProject::new();
    project
        .write("src/sass/pages/_mixins.scss", "@mixin pad { padding: 1px; }\n")
        .write(
            "src/sass/pages/home.scss",
            "@import 'mixins';\n.home { @include pad; }\n",
        );
    let ctx = project.ctx(
        SiteConfigBuilder::new()
            .output_style(OutputStyle::Expanded)
            .source_maps(false)
            .build(),
    );

    let report = run_task(TaskKind::Style, &ctx).await?;
    assert_eq!(report.processed, 1);

    let css = project.read("dist/css/pages/home.css");
    assert!(css.contains(".home {"), "got: {css}");
    assert!(css.contains("padding: 1px"), "got: {css}");
    Ok(())
}

#[tokio::test]
async fn source_map_carries_the_compiled_css() -> TestResult {
    init_tracing();
    let project = broken_and_good();
    let ctx = project.ctx(SiteConfigBuilder::new().build());

    run_task(TaskKind::Style, &ctx).await?;

    let map: serde_json::Value = serde_json::from_str(&project.read("dist/css/good.css.map"))?;
    assert_eq!(map["version"], 3);
    let sources = map["sources"].as_array().ok_or("sources is not an array")?;
    assert_eq!(sources.len(), 1);
    let source = sources[0].as_str().ok_or("source is not a string")?;
    assert!(source.ends_with("good.scss.css"), "sources: {sources:?}");

    // The embedded content is grass's CSS, not the SCSS it came from.
    let content = map["sourcesContent"][0]
        .as_str()
        .ok_or("no sourcesContent")?;
    assert!(content.contains(".b"), "content: {content}");
    assert!(!content.contains("$c"), "content: {content}");
    Ok(())
}

#[tokio::test]
async fn scss_errors_name_the_file() -> TestResult {
    init_tracing();
    let project = broken_and_good();
    let ctx = project.ctx(SiteConfigBuilder::new().on_error(ErrorPolicy::Abort).build());

    match run_task(TaskKind::Style, &ctx).await {
        Err(SitepipeError::Style { message, .. }) => {
            assert!(message.contains("broken.scss"), "got: {message}");
            assert!(!message.contains("stdin"), "got: {message}");
        }
        other => panic!("expected a style error, got {other:?}"),
    }
    Ok(())
}
