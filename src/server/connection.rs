use crate::model::{OutboundMessage, SessionId, SignalingError};
use axum::extract::ws::Message;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{channel, Receiver, Sender};

/// Frames that may wait for one slow client before further sends are dropped.
pub const OUTGOING_QUEUE_CAPACITY: usize = 64;

/// Send side of one live WebSocket connection.
#[derive(Debug, Clone)]
pub struct Connection {
    pub session_id: SessionId,
    pub sender: Sender<Message>,
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.session_id == other.session_id
    }
}

impl Connection {
    pub fn new(session_id: SessionId, sender: Sender<Message>) -> Self {
        Connection { session_id, sender }
    }

    /// A connection paired with the receiving end of its frame queue.
    pub fn channel(session_id: SessionId) -> (Self, Receiver<Message>) {
        let (sender, rx) = channel(OUTGOING_QUEUE_CAPACITY);
        (Connection::new(session_id, sender), rx)
    }

    /// Queues `message` as a text frame. Never blocks; fails when the
    /// connection's writer has gone away or its queue is full.
    pub fn send(&self, message: &OutboundMessage) -> Result<(), SignalingError> {
        let text = serde_json::to_string(message)
            .map_err(|e| SignalingError::SendFailed(e.to_string()))?;
        self.sender
            .try_send(Message::Text(text))
            .map_err(|e| match e {
                TrySendError::Full(_) => SignalingError::SendFailed(format!(
                    "outgoing queue of session {} is full",
                    self.session_id
                )),
                TrySendError::Closed(_) => {
                    SignalingError::SendFailed(format!("session {} closed", self.session_id))
                }
            })
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
