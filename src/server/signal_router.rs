use super::{Connection, Departure, SessionRegistry};
use crate::model::{
    OutboundMessage, Payload, RelayKind, RoomId, SessionId, Signal, SignalingError,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Dispatches inbound signaling frames for every connection. Cheap to clone;
/// all state lives in the injected registry.
#[derive(Clone)]
pub struct SignalRouter {
    registry: Arc<dyn SessionRegistry>,
}

impl fmt::Debug for SignalRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalRouter").finish_non_exhaustive()
    }
}

impl SignalRouter {
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        SignalRouter { registry }
    }

    pub fn registry(&self) -> &Arc<dyn SessionRegistry> {
        &self.registry
    }

    /// Parses one text frame and dispatches it.
    pub async fn handle_text(
        &self,
        connection: &Connection,
        text: &str,
    ) -> Result<(), SignalingError> {
        let signal = Signal::parse(text)?;
        if matches!(signal, Signal::Unknown) {
            warn!(session_id = %connection.session_id, %text, "Dropping message of unknown type");
            return Ok(());
        }
        self.dispatch(connection, signal).await
    }

    #[instrument(skip(self, connection, signal), fields(session_id = %connection.session_id, kind = %signal.message_type()))]
    pub async fn dispatch(
        &self,
        connection: &Connection,
        signal: Signal,
    ) -> Result<(), SignalingError> {
        match signal {
            Signal::JoinRoom {
                room_id,
                nickname,
                payload,
            } => {
                self.join_room(connection, room_id, nickname, payload).await;
                Ok(())
            }
            Signal::Relay {
                kind,
                room_id,
                receiver,
                nickname,
                payload,
            } => {
                self.relay(connection, kind, room_id, receiver, nickname, payload)
                    .await
            }
            Signal::Unknown => {
                debug!("Ignoring unknown signal");
                Ok(())
            }
        }
    }

    async fn join_room(
        &self,
        connection: &Connection,
        room_id: RoomId,
        nickname: String,
        payload: Payload,
    ) {
        let session_id = connection.session_id;
        let outcome = self
            .registry
            .join(room_id, connection.clone(), nickname)
            .await;

        if let Some(previous) = outcome.previous {
            notify_departure(&previous);
        }

        info!(
            room_id,
            peers = outcome.peers.len(),
            "Session joined room"
        );
        let roster = OutboundMessage::all_users(session_id, &outcome.peers, payload);
        if let Err(e) = connection.send(&roster) {
            warn!(error = %e, "Failed to send all_users");
        }
    }

    async fn relay(
        &self,
        connection: &Connection,
        kind: RelayKind,
        room_id: RoomId,
        receiver: Option<String>,
        nickname: Option<String>,
        payload: Payload,
    ) -> Result<(), SignalingError> {
        if !self.registry.room_exists(room_id).await {
            return Err(SignalingError::RoomNotFound(room_id));
        }

        let Some(receiver) = receiver
            .as_deref()
            .and_then(|id| id.parse::<SessionId>().ok())
        else {
            debug!(room_id, ?receiver, "Relay without a valid receiver, dropping");
            return Ok(());
        };
        let Some(target) = self.registry.member_of(room_id, receiver).await else {
            debug!(room_id, %receiver, "Receiver not in room, dropping");
            return Ok(());
        };

        let sender_alias = match nickname {
            Some(nickname) => Some(nickname),
            None => self.registry.get_alias(connection.session_id).await,
        };
        let message = OutboundMessage::relay(
            kind.message_type(),
            connection.session_id,
            sender_alias,
            receiver,
            payload,
        );
        if let Err(e) = target.send(&message) {
            warn!(error = %e, %receiver, "Failed to relay message");
        } else {
            debug!(room_id, %receiver, "Relayed message");
        }
        Ok(())
    }

    /// Removes a closed connection from the registry and tells the rest of
    /// its room.
    #[instrument(skip(self))]
    pub async fn disconnect(&self, session_id: SessionId) {
        match self.registry.leave(session_id).await {
            Some(departure) => {
                info!(room_id = departure.room_id, "Session left room");
                notify_departure(&departure);
            }
            None => debug!("Session never joined a room"),
        }
    }
}

fn notify_departure(departure: &Departure) {
    for member in &departure.remaining {
        let message = OutboundMessage::leave(departure.session_id, member.session_id);
        if let Err(e) = member.send(&message) {
            warn!(error = %e, receiver = %member.session_id, "Failed to send leave");
        }
    }
}
