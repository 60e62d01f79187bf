use super::{Peer, RoomId, SessionId};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    JoinRoom,
    Offer,
    Answer,
    Candidate,
    AllUsers,
    Leave,
    #[serde(other)]
    Unknown,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::JoinRoom => "join_room",
            MessageType::Offer => "offer",
            MessageType::Answer => "answer",
            MessageType::Candidate => "candidate",
            MessageType::AllUsers => "all_users",
            MessageType::Leave => "leave",
            MessageType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handshake fields. The relay never looks inside them; the raw
/// JSON text is kept so it can be written back out unchanged.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    pub data: Option<String>,
    pub offer: Option<Box<RawValue>>,
    pub answer: Option<Box<RawValue>>,
    pub candidate: Option<Box<RawValue>>,
    pub sdp: Option<Box<RawValue>>,
}

/// A text frame as sent by a browser client.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    #[serde(rename = "type")]
    pub kind: MessageType,
    /// Target session id as the client wrote it. Only resolved against the
    /// room once the room is known to exist.
    #[serde(default)]
    pub receiver: Option<String>,
    #[serde(default, deserialize_with = "deserialize_room_id")]
    pub room_id: Option<RoomId>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub offer: Option<Box<RawValue>>,
    #[serde(default)]
    pub answer: Option<Box<RawValue>>,
    #[serde(default)]
    pub candidate: Option<Box<RawValue>>,
    #[serde(default)]
    pub sdp: Option<Box<RawValue>>,
}

impl InboundMessage {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn take_payload(&mut self) -> Payload {
        Payload {
            data: self.data.take(),
            offer: self.offer.take(),
            answer: self.answer.take(),
            candidate: self.candidate.take(),
            sdp: self.sdp.take(),
        }
    }
}

// Browsers occasionally send the room id as a string.
fn deserialize_room_id<'de, D>(deserializer: D) -> Result<Option<RoomId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawRoomId {
        Number(RoomId),
        Text(String),
    }

    match Option::<RawRoomId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawRoomId::Number(id)) => Ok(Some(id)),
        Some(RawRoomId::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid roomId `{}`", text))),
    }
}

/// A text frame produced by the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    #[serde(rename = "type")]
    pub kind: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_nick_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<Box<RawValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Box<RawValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate: Option<Box<RawValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp: Option<Box<RawValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_users: Option<Vec<SessionId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_users_nick_names: Option<HashMap<SessionId, String>>,
}

impl OutboundMessage {
    fn empty(kind: MessageType) -> Self {
        OutboundMessage {
            kind,
            sender: None,
            sender_nick_name: None,
            receiver: None,
            data: None,
            offer: None,
            answer: None,
            candidate: None,
            sdp: None,
            all_users: None,
            all_users_nick_names: None,
        }
    }

    /// Room roster sent back to a session that just joined. `peers` keeps
    /// the order in which the other members joined. The join's `data`,
    /// `candidate` and `sdp` are echoed back.
    pub fn all_users(session_id: SessionId, peers: &[Peer], payload: Payload) -> Self {
        OutboundMessage {
            sender: Some(session_id),
            data: payload.data,
            candidate: payload.candidate,
            sdp: payload.sdp,
            all_users: Some(peers.iter().map(|peer| peer.session_id).collect()),
            all_users_nick_names: Some(
                peers
                    .iter()
                    .map(|peer| (peer.session_id, peer.alias.clone()))
                    .collect(),
            ),
            ..Self::empty(MessageType::AllUsers)
        }
    }

    pub fn relay(
        kind: MessageType,
        sender: SessionId,
        sender_nick_name: Option<String>,
        receiver: SessionId,
        payload: Payload,
    ) -> Self {
        OutboundMessage {
            sender: Some(sender),
            sender_nick_name,
            receiver: Some(receiver),
            data: payload.data,
            offer: payload.offer,
            answer: payload.answer,
            candidate: payload.candidate,
            sdp: payload.sdp,
            ..Self::empty(kind)
        }
    }

    pub fn leave(sender: SessionId, receiver: SessionId) -> Self {
        OutboundMessage {
            sender: Some(sender),
            receiver: Some(receiver),
            ..Self::empty(MessageType::Leave)
        }
    }
}
