//! HTTP server lifecycle

use crate::api::create_router;
use crate::service::AppState;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

/// HTTP server serving the registration API with graceful shutdown
pub struct HttpServer {
    state: Arc<AppState>,
    shutdown_tx: watch::Sender<bool>,
}

impl HttpServer {
    /// Create a new server over the shared application state
    pub fn new(state: Arc<AppState>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self { state, shutdown_tx }
    }

    /// Bind the configured address and serve until [`HttpServer::stop`]
    pub async fn start(&self) -> Result<()> {
        let address = self.state.config().bind_address();
        let addr: SocketAddr = address
            .parse()
            .with_context(|| format!("Invalid HTTP server address: {}", address))?;

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        self.serve(listener).await
    }

    /// Serve on an already bound listener until [`HttpServer::stop`]
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        let app = create_router(self.state.clone());

        info!("HTTP server listening on http://{}", local_addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.wait_for(|stopped| *stopped).await;
                info!("HTTP server shutdown signal received");
            })
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Signal the server to stop accepting connections.
    ///
    /// The signal is sticky: a server that starts serving after `stop` has
    /// been called shuts down immediately.
    pub fn stop(&self) {
        info!("Stopping HTTP server...");
        self.shutdown_tx.send_replace(true);
    }
}
