use super::{InboundMessage, MessageType, Payload, RoomId, SignalingError};

/// Handshake messages forwarded to exactly one receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayKind {
    Offer,
    Answer,
    Candidate,
}

impl RelayKind {
    pub fn message_type(&self) -> MessageType {
        match self {
            RelayKind::Offer => MessageType::Offer,
            RelayKind::Answer => MessageType::Answer,
            RelayKind::Candidate => MessageType::Candidate,
        }
    }
}

/// A validated inbound message, ready for dispatch.
#[derive(Debug, Clone)]
pub enum Signal {
    JoinRoom {
        room_id: RoomId,
        nickname: String,
        payload: Payload,
    },
    Relay {
        kind: RelayKind,
        room_id: RoomId,
        /// Unresolved target. Missing or unknown receivers are dropped by
        /// the router after the room check.
        receiver: Option<String>,
        nickname: Option<String>,
        payload: Payload,
    },
    Unknown,
}

impl Signal {
    pub fn parse(text: &str) -> Result<Self, SignalingError> {
        let message = InboundMessage::parse(text)?;
        Signal::try_from(message)
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            Signal::JoinRoom { .. } => MessageType::JoinRoom,
            Signal::Relay { kind, .. } => kind.message_type(),
            Signal::Unknown => MessageType::Unknown,
        }
    }
}

impl TryFrom<InboundMessage> for Signal {
    type Error = SignalingError;

    fn try_from(mut message: InboundMessage) -> Result<Self, Self::Error> {
        let kind = match message.kind {
            MessageType::JoinRoom => {
                let room_id = require_room_id(&message)?;
                return Ok(Signal::JoinRoom {
                    room_id,
                    nickname: message.nickname.take().unwrap_or_default(),
                    payload: message.take_payload(),
                });
            }
            MessageType::Offer => RelayKind::Offer,
            MessageType::Answer => RelayKind::Answer,
            MessageType::Candidate => RelayKind::Candidate,
            // all_users and leave only ever travel server -> client.
            MessageType::AllUsers | MessageType::Leave | MessageType::Unknown => {
                return Ok(Signal::Unknown)
            }
        };

        let room_id = require_room_id(&message)?;

        Ok(Signal::Relay {
            kind,
            room_id,
            receiver: message.receiver.take(),
            nickname: message.nickname.take(),
            payload: message.take_payload(),
        })
    }
}

fn require_room_id(message: &InboundMessage) -> Result<RoomId, SignalingError> {
    message.room_id.ok_or(SignalingError::MissingField {
        kind: message.kind,
        field: "roomId",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_join_room() {
        let signal = Signal::parse(r#"{"type":"join_room","roomId":5,"nickname":"owl","data":"hi"}"#)
            .unwrap();
        match signal {
            Signal::JoinRoom {
                room_id,
                nickname,
                payload,
            } => {
                assert_eq!(room_id, 5);
                assert_eq!(nickname, "owl");
                assert_eq!(payload.data.as_deref(), Some("hi"));
            }
            other => panic!("unexpected signal {:?}", other),
        }
    }

    #[test]
    fn test_join_room_without_nickname() {
        let signal = Signal::parse(r#"{"type":"join_room","roomId":5}"#).unwrap();
        assert!(matches!(signal, Signal::JoinRoom { ref nickname, .. } if nickname.is_empty()));
    }

    #[test]
    fn test_join_room_requires_room_id() {
        let error = Signal::parse(r#"{"type":"join_room","nickname":"owl"}"#).unwrap_err();
        assert!(matches!(
            error,
            SignalingError::MissingField {
                kind: MessageType::JoinRoom,
                field: "roomId"
            }
        ));
    }

    #[test]
    fn test_candidate() {
        let receiver = Uuid::new_v4();
        let text = format!(
            r#"{{"type":"candidate","roomId":9,"receiver":"{}","candidate":{{"candidate":"candidate:1 1 udp 2122260223 10.0.0.2 54400 typ host","sdpMid":"0"}}}}"#,
            receiver
        );
        let signal = Signal::parse(&text).unwrap();
        assert_eq!(signal.message_type(), MessageType::Candidate);
        match signal {
            Signal::Relay {
                kind,
                room_id,
                receiver: parsed,
                payload,
                ..
            } => {
                assert_eq!(kind, RelayKind::Candidate);
                assert_eq!(room_id, 9);
                assert_eq!(parsed, Some(receiver.to_string()));
                assert!(payload.candidate.is_some());
                assert!(payload.offer.is_none());
            }
            other => panic!("unexpected signal {:?}", other),
        }
    }

    #[test]
    fn test_relay_receiver_is_optional() {
        let signal = Signal::parse(r#"{"type":"answer","roomId":9}"#).unwrap();
        assert!(matches!(signal, Signal::Relay { receiver: None, .. }));

        let signal =
            Signal::parse(r#"{"type":"answer","roomId":9,"receiver":"not-a-uuid"}"#).unwrap();
        assert!(matches!(
            signal,
            Signal::Relay { receiver: Some(ref r), .. } if r == "not-a-uuid"
        ));
    }

    #[test]
    fn test_relay_requires_room_id() {
        let error = Signal::parse(r#"{"type":"offer","receiver":"x"}"#).unwrap_err();
        assert!(matches!(
            error,
            SignalingError::MissingField {
                kind: MessageType::Offer,
                field: "roomId"
            }
        ));
    }

    #[test]
    fn test_server_types_are_not_accepted() {
        let signal = Signal::parse(r#"{"type":"leave","roomId":1}"#).unwrap();
        assert!(matches!(signal, Signal::Unknown));
        let signal = Signal::parse(r#"{"type":"shout"}"#).unwrap();
        assert!(matches!(signal, Signal::Unknown));
    }
}
