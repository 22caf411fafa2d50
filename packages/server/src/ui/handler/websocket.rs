//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, OutboundFrame},
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that forwards encoded frames from `rx` to the WebSocket sink.
///
/// Frames go out in queue order; a pending frame (history replay) is awaited
/// before anything queued after it. The task ends once every sender of `rx`
/// is dropped (the session was closed by the server) after flushing what was
/// queued, and then sends a close frame.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<OutboundFrame>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let Some(frame) = frame.resolve().await else {
                continue;
            };
            if sender.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
        }
        let _ = sender.send(Message::Close(None)).await;
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection = ConnectionId::generate();
    let (tx, rx) = mpsc::unbounded_channel();
    state.session_coordinator.connect(connection, tx).await;

    let (sender, mut receiver) = socket.split();
    let state_clone = state.clone();

    // Spawn a task to receive frames from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on connection {}: {}", connection, e);
                    break;
                }
            };

            let text = match msg {
                Message::Text(text) => text.as_str().to_string(),
                // Some clients send the same payload as a binary frame
                Message::Binary(bytes) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(
                            "Dropping binary frame from connection {}: {}",
                            connection,
                            e
                        );
                        continue;
                    }
                },
                Message::Ping(_) => {
                    // Ping/pong is handled automatically by the WebSocket protocol
                    tracing::debug!("Received ping from connection {}", connection);
                    continue;
                }
                Message::Close(_) => {
                    tracing::info!("Connection {} requested close", connection);
                    break;
                }
                Message::Pong(_) => continue,
            };

            match state_clone.codec.decode(&text) {
                Ok(message) => {
                    state_clone
                        .session_coordinator
                        .handle_message(connection, message)
                        .await;
                }
                Err(e) => {
                    tracing::warn!("Dropping frame from connection {}: {}", connection, e);
                }
            }
        }
    });

    // Spawn a task to push server events to this client
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.session_coordinator.disconnect(connection).await;
}
