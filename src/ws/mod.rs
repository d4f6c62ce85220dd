pub mod handlers;
pub mod host;
pub mod player;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::engine::{Event, GameHandle};
use crate::protocol::{ClientMessage, ServerMessage};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(game): State<GameHandle>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, game))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, game: GameHandle) {
    let (mut sender, mut receiver) = socket.split();
    let conn_id = ulid::Ulid::new().to_string();

    // Everything the game sends to this connection arrives on this queue
    let (tx, mut outbound_rx) = mpsc::unbounded_channel::<ServerMessage>();
    if !game.send(Event::Connected {
        conn_id: conn_id.clone(),
        sender: tx,
    }) {
        tracing::error!("Game loop is not running, dropping connection");
        return;
    }

    tracing::info!("WebSocket connected: {}", conn_id);

    loop {
        tokio::select! {
            // Messages from the game loop
            outbound = outbound_rx.recv() => {
                let Some(msg) = outbound else { break };
                match serde_json::to_string(&msg) {
                    Ok(json) => {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::error!("Failed to serialize server message: {}", e),
                }
            }

            // Handle client messages
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message from {}: {}", conn_id, text);

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(msg) => {
                                if !game.send(Event::Message { conn_id: conn_id.clone(), msg }) {
                                    break;
                                }
                            }
                            // Malformed input is ignored like any other invalid command
                            Err(e) => tracing::debug!("Failed to parse client message: {}", e),
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    game.send(Event::Disconnected {
        conn_id: conn_id.clone(),
    });
    tracing::info!("WebSocket connection closed: {}", conn_id);
}
