// src/reload.rs

//! Live-reload notification channel.
//!
//! Every task holds a clone of [`LiveReload`] and pushes a [`ReloadEvent`]
//! after writing its outputs. The dev server subscribes one receiver per
//! connected browser. Without a server there are no receivers and events are
//! simply dropped.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

/// Message relayed to connected browsers, serialized as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadEvent {
    /// Full page refresh.
    Reload,
    /// Swap one stylesheet in place. `path` is the URL path, e.g. `/css/main.css`.
    Css { path: String },
}

/// Cloneable handle to the process-wide broadcast channel.
#[derive(Debug, Clone)]
pub struct LiveReload {
    tx: broadcast::Sender<ReloadEvent>,
}

impl LiveReload {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(64);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.tx.subscribe()
    }

    /// Broadcast an event; returns how many browsers (receivers) got it.
    pub fn send(&self, event: ReloadEvent) -> usize {
        match self.tx.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                trace!(?event, "no live-reload listeners");
                0
            }
        }
    }
}

impl Default for LiveReload {
    fn default() -> Self {
        Self::new()
    }
}
