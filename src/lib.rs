//! WebRTC signaling relay.
//!
//! Browser clients join numbered rooms over a WebSocket, learn who else is
//! present, and exchange offers, answers and ICE candidates through the
//! relay. Handshake payloads are forwarded untouched.

pub mod config;
pub mod model;
pub mod server;

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::model::{
        MessageType, OutboundMessage, Peer, RoomId, SessionId, Signal, SignalingError,
    };
    pub use crate::server::{
        Connection, MemoryRegistry, SessionRegistry, SignalRouter, SignalServer,
    };
}
