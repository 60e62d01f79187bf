use super::Connection;
use crate::model::{Peer, RoomId, SessionId};
use async_trait::async_trait;
use std::collections::HashMap;

/// Result of a successful join.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    /// Other members of the joined room, in the order they joined.
    pub peers: Vec<Peer>,
    /// Set when the session had to be moved out of a different room first.
    pub previous: Option<Departure>,
}

/// A session leaving a room, and who was left behind.
#[derive(Debug, Clone)]
pub struct Departure {
    pub session_id: SessionId,
    pub room_id: RoomId,
    pub remaining: Vec<Connection>,
}

/// Shared store of room membership, session to room bindings and aliases.
///
/// The single-step operations mirror the three maps one to one. `join` and
/// `leave` apply several of them as one step under the room's lock, and
/// are what the signal router uses.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    async fn room_exists(&self, room_id: RoomId) -> bool;

    async fn add_member(&self, room_id: RoomId, connection: Connection);

    async fn bind_session_to_room(&self, session_id: SessionId, room_id: RoomId);

    async fn set_alias(&self, session_id: SessionId, alias: String);

    async fn get_alias(&self, session_id: SessionId) -> Option<String>;

    /// Snapshot of the room's members. Empty when the room is unknown.
    async fn members_of(&self, room_id: RoomId) -> HashMap<SessionId, Connection>;

    async fn member_of(&self, room_id: RoomId, session_id: SessionId) -> Option<Connection>;

    async fn room_of(&self, session_id: SessionId) -> Option<RoomId>;

    async fn remove_member(&self, room_id: RoomId, session_id: SessionId);

    async fn unbind_session(&self, session_id: SessionId);

    async fn remove_alias(&self, session_id: SessionId);

    async fn join(&self, room_id: RoomId, connection: Connection, alias: String) -> JoinOutcome;

    async fn leave(&self, session_id: SessionId) -> Option<Departure>;

    async fn room_count(&self) -> usize;

    async fn session_count(&self) -> usize;
}
