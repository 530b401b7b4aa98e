// src/server/ws.rs

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::reload::ReloadEvent;

use super::router::ServerState;

pub async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| relay(socket, state))
}

/// Forward every `ReloadEvent` to one browser until either side goes away.
async fn relay(mut socket: WebSocket, state: Arc<ServerState>) {
    info!("live-reload client connected");
    let mut rx = state.reload.subscribe();

    loop {
        let event = tokio::select! {
            received = rx.recv() => match received {
                Ok(event) => event,
                // Missed events; a full reload covers all of them.
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "live-reload client lagged; forcing reload");
                    ReloadEvent::Reload
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => continue,
            },
        };

        let json = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "failed to encode reload event");
                continue;
            }
        };

        if socket.send(Message::Text(json.into())).await.is_err() {
            break;
        }
        debug!(?event, "sent reload event");
    }

    info!("live-reload client disconnected");
}
