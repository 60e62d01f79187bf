mod error;
mod message;
mod session;
mod signal;

pub use error::SignalingError;
pub use message::{InboundMessage, MessageType, OutboundMessage, Payload};
pub use session::{Peer, RoomId, SessionId};
pub use signal::{RelayKind, Signal};
