use clap::Parser;
use signal_relay::config::Config;
use signal_relay::server::telemetry::{init_telemetry, shutdown_telemetry};
use signal_relay::server::SignalServer;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    if let Err(e) = init_telemetry(&config) {
        eprintln!("Failed to initialize telemetry: {}", e);
        return ExitCode::FAILURE;
    }

    let result = match SignalServer::new(config.clone()) {
        Ok(server) => server.run().await,
        Err(e) => Err(e),
    };

    shutdown_telemetry(&config);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Signal relay failed");
            ExitCode::FAILURE
        }
    }
}
