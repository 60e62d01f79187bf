use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PATH: &str = "/signal";

#[derive(Debug, Clone, Parser)]
#[command(name = "signal-relay", version, about = "Room based WebRTC signaling relay")]
pub struct Config {
    /// Address to bind the listener to
    #[arg(long, env = "SIGNAL_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to bind the listener to
    #[arg(short, long, env = "SIGNAL_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// HTTP path that accepts WebSocket upgrades
    #[arg(long, env = "SIGNAL_PATH", default_value = DEFAULT_PATH)]
    pub path: String,

    /// Delete a room once its last member leaves
    #[arg(long, env = "SIGNAL_PRUNE_EMPTY_ROOMS")]
    pub prune_empty_rooms: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,

    /// Export traces to Jaeger (requires the `telemetry` feature)
    #[arg(long, env = "ENABLE_TELEMETRY")]
    pub enable_telemetry: bool,

    #[arg(
        long,
        env = "JAEGER_ENDPOINT",
        default_value = "http://jaeger:14268/api/traces"
    )]
    pub jaeger_endpoint: String,
}

impl Config {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.path.starts_with('/') {
            return Err(format!("path must start with '/', got `{}`", self.path));
        }
        if self.path == "/health" {
            return Err("path `/health` is reserved".to_string());
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.to_string(),
            prune_empty_rooms: false,
            log_json: false,
            enable_telemetry: false,
            jaeger_endpoint: "http://jaeger:14268/api/traces".to_string(),
        }
    }
}
