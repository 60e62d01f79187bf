use crate::model::{SessionId, SignalingError};
use crate::server::{Connection, SignalRouter};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

pub async fn handle_websocket(
    ws: WebSocketUpgrade,
    State(router): State<SignalRouter>,
) -> impl IntoResponse {
    debug!("New WebSocket upgrade request");
    ws.on_upgrade(move |socket| listen(socket, router, Uuid::new_v4()))
}

#[instrument(skip(socket, router))]
async fn listen(socket: WebSocket, router: SignalRouter, session_id: SessionId) {
    info!("WebSocket connection established");
    let (ws_sender, ws_receiver) = socket.split();
    let (connection, rx) = Connection::channel(session_id);

    let sender_task = handle_outgoing_messages(rx, ws_sender);
    let receiver_task = handle_incoming_messages(ws_receiver, &connection, &router);

    tokio::select! {
        _ = sender_task => {
            info!("Sender task completed");
        }
        _ = receiver_task => {
            info!("Receiver task completed");
        }
    }
    router.disconnect(session_id).await;
}

pub async fn handle_outgoing_messages(
    mut rx: Receiver<Message>,
    mut ws_sender: SplitSink<WebSocket, Message>,
) {
    while let Some(msg) = rx.recv().await {
        if let Err(e) = ws_sender.send(msg).await {
            error!(error = ?e, "Failed to send message");
            break;
        }
    }
}

pub async fn handle_incoming_messages(
    mut receiver: SplitStream<WebSocket>,
    connection: &Connection,
    router: &SignalRouter,
) {
    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => handle_text(&text, connection, router).await,
            Ok(Message::Close(frame)) => {
                debug!(?frame, "Client closed connection");
                break;
            }
            Ok(Message::Binary(_)) => {
                warn!("Binary frames are not supported");
            }
            Ok(_) => {}
            Err(e) => {
                error!(error = ?e, "Failed to receive message");
                break;
            }
        }
    }
}

async fn handle_text(text: &str, connection: &Connection, router: &SignalRouter) {
    match router.handle_text(connection, text).await {
        Ok(()) => {}
        Err(e @ SignalingError::RoomNotFound(_)) => {
            warn!(error = %e, "Relay rejected");
        }
        Err(e) if e.is_malformed() => {
            error!(error = %e, %text, "Failed to parse message");
        }
        Err(e) => {
            error!(error = %e, "Failed to handle message");
        }
    }
}
