// src/server/mod.rs

//! Development server.
//!
//! - [`router`] builds the axum router: index, static files, client script.
//! - [`ws`] relays `ReloadEvent`s to browsers over a WebSocket.
//! - [`client`] holds the injected live-reload client.

pub mod client;
pub mod router;
pub mod ws;

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::errors::{Result, SitepipeError};
use crate::tasks::TaskContext;

pub use router::{ServerState, setup_router};

/// A bound, not yet serving, dev server.
#[derive(Debug)]
pub struct DevServer {
    listener: TcpListener,
    router: Router,
    addr: SocketAddr,
}

impl DevServer {
    /// Bind `[server].host:port` and build the router for `[server].base_dir`.
    pub async fn bind(ctx: &TaskContext) -> Result<Self> {
        let cfg = &ctx.config.server;
        let bind_to = format!("{}:{}", cfg.host, cfg.port);

        let listener = TcpListener::bind(&bind_to)
            .await
            .map_err(|e| SitepipeError::Server(format!("binding {bind_to}: {e}")))?;
        let addr = listener.local_addr()?;

        let router = setup_router(ServerState {
            base_dir: ctx.resolve(&cfg.base_dir),
            index: cfg.index.clone(),
            reload: ctx.reload.clone(),
            notify: cfg.notify,
        });

        Ok(Self {
            listener,
            router,
            addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Serve until the task is aborted.
    pub async fn serve(self) -> Result<()> {
        info!(url = %self.url(), "dev server listening");
        axum::serve(self.listener, self.router)
            .await
            .map_err(|e| SitepipeError::Server(e.to_string()))
    }
}

/// Open `url` in the default browser; failure is only logged.
pub fn open_browser(url: &str) {
    match open::that_detached(url) {
        Ok(()) => info!(%url, "opened browser"),
        Err(err) => warn!(%url, error = %err, "could not open a browser"),
    }
}
