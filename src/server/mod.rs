mod connection;
pub mod error;
mod memory_registry;
mod registry;
mod route;
mod signal_router;
mod signal_server;
pub mod telemetry;
mod websocket_listener;

pub use connection::Connection;
pub use error::ServerError;
pub use memory_registry::MemoryRegistry;
pub use registry::{Departure, JoinOutcome, SessionRegistry};
pub use route::create_signal_route;
pub use signal_router::SignalRouter;
pub use signal_server::SignalServer;
pub use websocket_listener::handle_websocket;
