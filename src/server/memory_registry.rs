use super::{Connection, Departure, JoinOutcome, SessionRegistry};
use crate::model::{Peer, RoomId, SessionId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
struct Member {
    connection: Connection,
    joined_at: u64,
}

#[derive(Debug, Default)]
struct Room {
    members: HashMap<SessionId, Member>,
    // Set once a pruned room has been unlinked from the rooms map.
    closed: bool,
}

impl Room {
    fn connections_in_join_order(&self) -> Vec<Connection> {
        let mut members: Vec<&Member> = self.members.values().collect();
        members.sort_by_key(|member| member.joined_at);
        members
            .into_iter()
            .map(|member| member.connection.clone())
            .collect()
    }
}

#[derive(Debug, Default)]
struct SessionTable {
    rooms: HashMap<SessionId, RoomId>,
    aliases: HashMap<SessionId, String>,
}

/// In-process registry. Each room has its own lock so unrelated rooms never
/// contend; the session table sits behind a single lock.
///
/// Locks are always taken in the order rooms map, room, session table, and
/// the rooms map lock is never held while waiting on a room.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    rooms: RwLock<HashMap<RoomId, Arc<RwLock<Room>>>>,
    sessions: RwLock<SessionTable>,
    join_sequence: AtomicU64,
    prune_empty_rooms: bool,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a room's record once its last member leaves instead of keeping
    /// the empty room around.
    pub fn with_room_pruning(mut self, prune_empty_rooms: bool) -> Self {
        self.prune_empty_rooms = prune_empty_rooms;
        self
    }

    async fn lookup_room(&self, room_id: RoomId) -> Option<Arc<RwLock<Room>>> {
        self.rooms.read().await.get(&room_id).cloned()
    }

    async fn open_room(&self, room_id: RoomId) -> Arc<RwLock<Room>> {
        if let Some(room) = self.lookup_room(room_id).await {
            return room;
        }
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room_id)
            .or_insert_with(|| {
                debug!(room_id, "Creating room");
                Arc::new(RwLock::new(Room::default()))
            })
            .clone()
    }

    fn next_sequence(&self) -> u64 {
        self.join_sequence.fetch_add(1, Ordering::Relaxed)
    }

    async fn forget_session(&self, session_id: SessionId) {
        let mut sessions = self.sessions.write().await;
        sessions.rooms.remove(&session_id);
        sessions.aliases.remove(&session_id);
    }

    // Caller holds the room's write lock, passed in as `guard`.
    async fn prune_if_empty(&self, room_id: RoomId, room: &Arc<RwLock<Room>>, guard: &mut Room) {
        if !self.prune_empty_rooms || !guard.members.is_empty() {
            return;
        }
        guard.closed = true;
        let mut rooms = self.rooms.write().await;
        if rooms
            .get(&room_id)
            .is_some_and(|current| Arc::ptr_eq(current, room))
        {
            rooms.remove(&room_id);
            debug!(room_id, "Removed empty room");
        }
    }
}

#[async_trait]
impl SessionRegistry for MemoryRegistry {
    async fn room_exists(&self, room_id: RoomId) -> bool {
        match self.lookup_room(room_id).await {
            Some(room) => !room.read().await.closed,
            None => false,
        }
    }

    #[instrument(skip(self, connection), fields(session_id = %connection.session_id))]
    async fn add_member(&self, room_id: RoomId, connection: Connection) {
        loop {
            let room = self.open_room(room_id).await;
            let mut guard = room.write().await;
            if guard.closed {
                continue;
            }
            let joined_at = match guard.members.get(&connection.session_id) {
                Some(existing) => existing.joined_at,
                None => self.next_sequence(),
            };
            guard.members.insert(
                connection.session_id,
                Member {
                    connection,
                    joined_at,
                },
            );
            return;
        }
    }

    async fn bind_session_to_room(&self, session_id: SessionId, room_id: RoomId) {
        self.sessions.write().await.rooms.insert(session_id, room_id);
    }

    async fn set_alias(&self, session_id: SessionId, alias: String) {
        self.sessions.write().await.aliases.insert(session_id, alias);
    }

    async fn get_alias(&self, session_id: SessionId) -> Option<String> {
        self.sessions.read().await.aliases.get(&session_id).cloned()
    }

    async fn members_of(&self, room_id: RoomId) -> HashMap<SessionId, Connection> {
        match self.lookup_room(room_id).await {
            Some(room) => room
                .read()
                .await
                .members
                .iter()
                .map(|(id, member)| (*id, member.connection.clone()))
                .collect(),
            None => HashMap::new(),
        }
    }

    async fn member_of(&self, room_id: RoomId, session_id: SessionId) -> Option<Connection> {
        let room = self.lookup_room(room_id).await?;
        let guard = room.read().await;
        guard
            .members
            .get(&session_id)
            .map(|member| member.connection.clone())
    }

    async fn room_of(&self, session_id: SessionId) -> Option<RoomId> {
        self.sessions.read().await.rooms.get(&session_id).copied()
    }

    #[instrument(skip(self))]
    async fn remove_member(&self, room_id: RoomId, session_id: SessionId) {
        if let Some(room) = self.lookup_room(room_id).await {
            let mut guard = room.write().await;
            guard.members.remove(&session_id);
            self.prune_if_empty(room_id, &room, &mut guard).await;
        }
    }

    async fn unbind_session(&self, session_id: SessionId) {
        self.sessions.write().await.rooms.remove(&session_id);
    }

    async fn remove_alias(&self, session_id: SessionId) {
        self.sessions.write().await.aliases.remove(&session_id);
    }

    #[instrument(skip(self, connection, alias), fields(session_id = %connection.session_id))]
    async fn join(&self, room_id: RoomId, connection: Connection, alias: String) -> JoinOutcome {
        let session_id = connection.session_id;

        let previous = match self.room_of(session_id).await {
            Some(current) if current != room_id => {
                info!(from = current, to = room_id, "Moving session to another room");
                self.leave(session_id).await
            }
            _ => None,
        };

        loop {
            let room = self.open_room(room_id).await;
            let mut guard = room.write().await;
            if guard.closed {
                continue;
            }

            let joined_at = match guard.members.get(&session_id) {
                Some(existing) => existing.joined_at,
                None => self.next_sequence(),
            };
            guard.members.insert(
                session_id,
                Member {
                    connection,
                    joined_at,
                },
            );

            let mut sessions = self.sessions.write().await;
            sessions.rooms.insert(session_id, room_id);
            sessions.aliases.insert(session_id, alias);

            let peers = guard
                .connections_in_join_order()
                .into_iter()
                .filter(|peer| peer.session_id != session_id)
                .map(|peer| {
                    let alias = sessions
                        .aliases
                        .get(&peer.session_id)
                        .cloned()
                        .unwrap_or_default();
                    Peer::new(peer.session_id, alias)
                })
                .collect::<Vec<_>>();

            debug!(member_count = guard.members.len(), "Session joined room");
            return JoinOutcome { peers, previous };
        }
    }

    #[instrument(skip(self))]
    async fn leave(&self, session_id: SessionId) -> Option<Departure> {
        let room_id = self.room_of(session_id).await?;

        let remaining = match self.lookup_room(room_id).await {
            Some(room) => {
                let mut guard = room.write().await;
                guard.members.remove(&session_id);
                self.forget_session(session_id).await;
                let remaining = guard.connections_in_join_order();
                self.prune_if_empty(room_id, &room, &mut guard).await;
                remaining
            }
            None => {
                self.forget_session(session_id).await;
                Vec::new()
            }
        };

        debug!(room_id, remaining = remaining.len(), "Session left room");
        Some(Departure {
            session_id,
            room_id,
            remaining,
        })
    }

    async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    async fn session_count(&self) -> usize {
        self.sessions.read().await.rooms.len()
    }
}
