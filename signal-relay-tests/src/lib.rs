use axum::extract::ws::Message;
use cucumber::World;
use signal_relay::model::{MessageType, OutboundMessage, SessionId, SignalingError};
use signal_relay::server::{Connection, MemoryRegistry, SignalRouter};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use uuid::Uuid;

/// A named browser client wired to the router through an in-memory queue.
#[derive(Debug)]
pub struct TestClient {
    pub connection: Connection,
    pub rx: Receiver<Message>,
    /// The most recent `all_users` this client received.
    pub roster: Option<OutboundMessage>,
}

impl TestClient {
    fn new() -> Self {
        let (connection, rx) = Connection::channel(Uuid::new_v4());
        TestClient {
            connection,
            rx,
            roster: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.connection.session_id
    }

    /// Everything queued for this client since the last call.
    pub fn drain(&mut self) -> Vec<OutboundMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            if let Message::Text(text) = message {
                messages.push(serde_json::from_str(&text).expect("relay sent invalid JSON"));
            }
        }
        messages
    }
}

#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct RelayWorld {
    /// The system under test
    pub router: SignalRouter,

    /// Clients by name, created on first mention
    pub clients: HashMap<String, TestClient>,

    /// Outcome of the last relay message
    pub last_result: Option<Result<(), String>>,

    /// Raw JSON of the last handshake payload that was sent
    pub last_payload: Option<String>,
}

impl RelayWorld {
    pub fn new() -> Self {
        RelayWorld {
            router: SignalRouter::new(Arc::new(MemoryRegistry::new())),
            clients: HashMap::new(),
            last_result: None,
            last_payload: None,
        }
    }

    pub fn client(&mut self, name: &str) -> &mut TestClient {
        self.clients
            .entry(name.to_string())
            .or_insert_with(TestClient::new)
    }

    pub fn client_id(&mut self, name: &str) -> SessionId {
        self.client(name).id()
    }

    /// Feeds a raw text frame from `name` to the router.
    pub async fn send_text(&mut self, name: &str, text: &str) -> Result<(), SignalingError> {
        let connection = self.client(name).connection.clone();
        self.router.handle_text(&connection, text).await
    }

    pub async fn join(&mut self, name: &str, room_id: i64, alias: &str) {
        let text = serde_json::json!({
            "type": "join_room",
            "roomId": room_id,
            "nickname": alias,
        })
        .to_string();
        self.send_text(name, &text)
            .await
            .expect("join_room should not fail");

        let client = self.client(name);
        let mut messages = client.drain();
        assert_eq!(messages.len(), 1, "{} expected a single roster", name);
        let roster = messages.remove(0);
        assert_eq!(roster.kind, MessageType::AllUsers);
        client.roster = Some(roster);
    }

    /// Sends a handshake message from `from` to `to`. `payload` is written
    /// into the frame as raw JSON.
    pub async fn relay(
        &mut self,
        from: &str,
        kind: &str,
        to: &str,
        room_id: i64,
        payload: &str,
        nickname: Option<&str>,
    ) {
        let receiver = self.client_id(to);
        let nickname = nickname
            .map(|alias| format!(r#","nickname":{}"#, serde_json::Value::from(alias)))
            .unwrap_or_default();
        let text = format!(
            r#"{{"type":"{kind}","roomId":{room_id},"receiver":"{receiver}"{nickname},"{kind}":{payload}}}"#
        );
        let result = self.send_text(from, &text).await;
        self.last_payload = Some(payload.to_string());
        self.last_result = Some(result.map_err(|e| e.to_string()));
    }
}

impl Default for RelayWorld {
    fn default() -> Self {
        Self::new()
    }
}
