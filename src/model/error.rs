use super::{MessageType, RoomId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignalingError {
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    #[error("Malformed message: {0}")]
    MalformedMessage(#[from] serde_json::Error),

    #[error("Missing field `{field}` in {kind} message")]
    MissingField {
        kind: MessageType,
        field: &'static str,
    },

    #[error("Send failed: {0}")]
    SendFailed(String),
}

impl SignalingError {
    /// True for errors caused by the shape of the inbound frame.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            SignalingError::MalformedMessage(_) | SignalingError::MissingField { .. }
        )
    }
}
