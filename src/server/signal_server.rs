use crate::config::Config;
use crate::server::error::{Result, ServerError};
use crate::server::{create_signal_route, MemoryRegistry, SessionRegistry, SignalRouter};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

pub struct SignalServer {
    config: Config,
    router: SignalRouter,
}

impl SignalServer {
    pub fn new(config: Config) -> Result<Self> {
        config.validate().map_err(ServerError::InvalidConfig)?;
        let registry = MemoryRegistry::new().with_room_pruning(config.prune_empty_rooms);
        Ok(Self::with_registry(config, Arc::new(registry)))
    }

    pub fn with_registry(config: Config, registry: Arc<dyn SessionRegistry>) -> Self {
        SignalServer {
            config,
            router: SignalRouter::new(registry),
        }
    }

    pub fn router(&self) -> &SignalRouter {
        &self.router
    }

    pub async fn bind(&self) -> Result<TcpListener> {
        Ok(TcpListener::bind(self.config.socket_addr()).await?)
    }

    pub async fn run(self) -> Result<()> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serves on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = listener.local_addr()?;
        info!("Signal relay listening on ws://{}{}", addr, self.config.path);

        let app = create_signal_route(&self.config.path, self.router);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Signal relay stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
