// src/server/router.rs

use std::convert::Infallible;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{self, HeaderValue};
use axum::http::{Response, StatusCode};
use axum::middleware::map_response;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::debug;

use crate::reload::LiveReload;

use super::client::{CLIENT_PATH, LIVERELOAD_PATH, client_js, inject_client};
use super::ws::livereload_handler;

/// Shared state behind every route.
#[derive(Debug, Clone)]
pub struct ServerState {
    /// Directory everything is served from.
    pub base_dir: PathBuf,
    /// Document for `/`, relative to `base_dir`.
    pub index: String,
    pub reload: LiveReload,
    pub notify: bool,
}

/// Sets up and returns the dev-server router.
pub fn setup_router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route(CLIENT_PATH, get(client_handler))
        .route(LIVERELOAD_PATH, get(livereload_handler))
        .fallback(file_handler)
        .layer(map_response(no_cache))
        .with_state(Arc::new(state))
}

async fn index_handler(State(state): State<Arc<ServerState>>) -> Response<Body> {
    serve_html(&state.base_dir, &state.index).await
}

async fn client_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        client_js(state.notify),
    )
}

/// HTML documents get the live-reload client injected; everything else is a
/// plain `ServeDir` lookup.
async fn file_handler(State(state): State<Arc<ServerState>>, req: Request) -> Response<Body> {
    let path = match urlencoding::decode(req.uri().path().trim_start_matches('/')) {
        Ok(path) => path.into_owned(),
        Err(err) => {
            debug!(uri = %req.uri(), error = %err, "undecodable request path");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    if path.is_empty() || path.ends_with('/') {
        return serve_html(&state.base_dir, &format!("{path}index.html")).await;
    }
    if path.ends_with(".html") || path.ends_with(".htm") {
        return serve_html(&state.base_dir, &path).await;
    }

    let result: Result<_, Infallible> = ServeDir::new(&state.base_dir).oneshot(req).await;
    match result {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}

async fn serve_html(base_dir: &Path, rel: &str) -> Response<Body> {
    let Some(file) = safe_join(base_dir, rel) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match tokio::fs::read_to_string(&file).await {
        Ok(html) => Html(inject_client(&html)).into_response(),
        Err(err) => {
            debug!(?file, error = %err, "html document not found");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// Join a URL path onto `base`, refusing anything that climbs out of it.
fn safe_join(base: &Path, rel: &str) -> Option<PathBuf> {
    let mut out = base.to_path_buf();
    for component in Path::new(rel).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(out)
}

async fn no_cache(mut response: Response<Body>) -> Response<Body> {
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    response
}
