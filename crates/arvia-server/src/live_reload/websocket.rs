//! WebSocket handler for live reload.
//!
//! Each connected tab gets one session. The server only ever sends the text
//! `reload`; inbound frames are read solely to notice the client leaving.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tokio::sync::watch;

use super::hub::ReloadHub;
use super::script::RELOAD_MESSAGE;
use crate::state::AppState;

/// Handle WebSocket upgrade for live reload.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(hub) = state.hub.clone() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let shutdown = state.shutdown.clone();

    ws.on_upgrade(move |socket| handle_socket(socket, hub, shutdown))
}

/// Drive an established session until either side goes away.
async fn handle_socket(
    mut socket: WebSocket,
    hub: Arc<ReloadHub>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut session = hub.register();
    let id = session.id();

    loop {
        tokio::select! {
            signal = session.recv() => {
                if signal.is_none() {
                    // Dropped by the hub.
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
                if socket.send(Message::Text(RELOAD_MESSAGE.into())).await.is_err() {
                    tracing::debug!(session = id, "Send failed, closing session");
                    break;
                }
            }
            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
            () = super::shutdown_requested(&mut shutdown) => {
                let _ = socket.send(Message::Close(None)).await;
                break;
            }
        }
    }

    // Dropping the session unregisters it.
    drop(session);
    tracing::debug!(session = id, "Live reload session closed");
}
