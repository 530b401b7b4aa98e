// tests/dev_server.rs

mod common;
use crate::common::{SiteConfigBuilder, TestProject, init_tracing};

use std::error::Error;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use sitepipe::reload::LiveReload;
use sitepipe::server::client::{CLIENT_PATH, LIVERELOAD_PATH};
use sitepipe::server::{DevServer, ServerState, setup_router};
use tower::ServiceExt;

type TestResult = Result<(), Box<dyn Error>>;

fn served_site() -> (TestProject, Router) {
    let project = TestProject::new();
    project
        .write(
            "dist/parsed/index.html",
            "<html><body><p>home</p></body></html>",
        )
        .write("dist/parsed/about/index.html", "<p>about</p>")
        .write("dist/css/main.css", ".a{color:red}")
        .write("dist/parsed/my page.html", "<p>spaced</p>")
        .write("secret.html", "<p>outside</p>");

    let router = setup_router(ServerState {
        base_dir: project.path("dist"),
        index: "parsed/index.html".to_string(),
        reload: LiveReload::new(),
        notify: false,
    });
    (project, router)
}

type Fetched = (StatusCode, HeaderMap, String);

async fn get(router: &Router, uri: &str) -> Result<Fetched, Box<dyn Error>> {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty())?)
        .await?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, headers, String::from_utf8(body.to_vec())?))
}

#[tokio::test]
async fn root_serves_index_with_client() -> TestResult {
    init_tracing();
    let (_project, router) = served_site();

    let (status, _, body) = get(&router, "/").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        format!("<html><body><p>home</p><script src=\"{CLIENT_PATH}\"></script></body></html>")
    );
    Ok(())
}

#[tokio::test]
async fn directories_fall_back_to_index_html() -> TestResult {
    init_tracing();
    let (_project, router) = served_site();

    let (status, _, body) = get(&router, "/parsed/about/").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("<p>about</p><script"), "got: {body}");
    Ok(())
}

#[tokio::test]
async fn static_assets_are_served_uncached() -> TestResult {
    init_tracing();
    let (_project, router) = served_site();

    let (status, headers, body) = get(&router, "/css/main.css").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ".a{color:red}");
    assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
    assert_eq!(headers[header::PRAGMA], "no-cache");
    assert_eq!(headers[header::EXPIRES], "0");
    assert!(
        headers[header::CONTENT_TYPE]
            .to_str()?
            .starts_with("text/css")
    );
    Ok(())
}

#[tokio::test]
async fn missing_files_are_not_found() -> TestResult {
    init_tracing();
    let (_project, router) = served_site();

    let (status, _, _) = get(&router, "/css/nope.css").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = get(&router, "/nope.html").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn documents_outside_the_base_dir_are_refused() -> TestResult {
    init_tracing();
    let (_project, router) = served_site();

    let (status, _, body) = get(&router, "/parsed/../../secret.html").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!body.contains("outside"));
    Ok(())
}

#[tokio::test]
async fn percent_encoded_html_paths_are_decoded() -> TestResult {
    init_tracing();
    let (_project, router) = served_site();

    let (status, _, body) = get(&router, "/parsed/my%20page.html").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        format!("<p>spaced</p><script src=\"{CLIENT_PATH}\"></script>")
    );

    let (status, _, body) = get(&router, "/parsed/%2e%2e/../secret.html").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!body.contains("outside"));
    Ok(())
}

#[tokio::test]
async fn client_script_carries_the_socket_path() -> TestResult {
    init_tracing();
    let (_project, router) = served_site();

    let (status, headers, body) = get(&router, CLIENT_PATH).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(
        headers[header::CONTENT_TYPE]
            .to_str()?
            .starts_with("application/javascript")
    );
    assert!(body.contains(LIVERELOAD_PATH));
    assert!(!body.contains("__SITEPIPE_"));
    Ok(())
}

#[tokio::test]
async fn plain_get_on_the_socket_is_rejected() -> TestResult {
    init_tracing();
    let (_project, router) = served_site();

    // No upgrade headers, so the WebSocket extractor refuses the request.
    let (status, _, _) = get(&router, LIVERELOAD_PATH).await?;
    assert!(status.is_client_error(), "got {status}");
    Ok(())
}

#[tokio::test]
async fn binding_port_zero_reports_the_real_address() -> TestResult {
    init_tracing();
    let project = TestProject::new();
    let ctx = project.ctx(SiteConfigBuilder::new().port(0).build());

    let server = DevServer::bind(&ctx).await?;
    let addr = server.local_addr();
    assert_ne!(addr.port(), 0);
    assert_eq!(server.url(), format!("http://127.0.0.1:{}/", addr.port()));
    Ok(())
}
