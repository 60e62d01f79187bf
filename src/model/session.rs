use uuid::Uuid;

pub type SessionId = Uuid;

pub type RoomId = i64;

/// Another member of a room as seen by a joining session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub session_id: SessionId,
    pub alias: String,
}

impl Peer {
    pub fn new(session_id: SessionId, alias: impl Into<String>) -> Self {
        Peer {
            session_id,
            alias: alias.into(),
        }
    }
}
