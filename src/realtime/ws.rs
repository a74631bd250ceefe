//! WebSocket endpoint for the real-time message feed.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use tracing::{debug, info, warn};

use super::hub::NotificationHub;
use crate::routes::AppState;

/// Upgrade handler for `GET /ws/messages`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    info!("Message feed client connecting");
    ws.on_upgrade(move |socket| handle_socket(socket, state.hub))
}

async fn handle_socket(mut socket: WebSocket, hub: Arc<NotificationHub>) {
    let mut handle = hub.connect().await;

    loop {
        tokio::select! {
            // Forward hub events to this client
            event = handle.rx.recv() => {
                match event {
                    Some(event) => {
                        match serde_json::to_string(&event) {
                            Ok(json) => {
                                if socket.send(Message::Text(json.into())).await.is_err() {
                                    debug!(observer_id = handle.id, "Client disconnected during send");
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!(error = %e, "Failed to serialize feed event");
                            }
                        }
                    }
                    None => {
                        debug!(observer_id = handle.id, "Observer channel closed");
                        break;
                    }
                }
            }

            // Clients may send pings or keepalive text; nothing else is expected.
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!(observer_id = handle.id, "Message feed client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(observer_id = handle.id, error = %e, "Message feed error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    hub.disconnect(handle.id).await;
    info!(observer_id = handle.id, "Message feed connection closed");
}
