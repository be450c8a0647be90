//! Node HTTP server lifecycle.

use crate::adapters::http::build_router;
use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::service::NodeGateway;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// A configured node API, ready to bind.
pub struct NodeGatewayService {
    config: GatewayConfig,
    gateway: Arc<NodeGateway>,
}

impl NodeGatewayService {
    /// Create the service.
    ///
    /// # Errors
    ///
    /// `GatewayError::Config` if the configuration does not validate.
    pub fn new(config: GatewayConfig, gateway: NodeGateway) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;
        Ok(Self {
            config,
            gateway: Arc::new(gateway),
        })
    }

    /// Router for in-process use.
    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.gateway), &self.config)
    }

    /// Bind the configured address and serve until shut down.
    ///
    /// # Errors
    ///
    /// `GatewayError::Bind` if the socket cannot be bound.
    pub async fn start(self) -> Result<RunningGateway, GatewayError> {
        let router = self.router();
        let (host, port) = (self.config.host.as_str(), self.config.port);
        let listener = TcpListener::bind((host, port))
            .await
            .map_err(|e| GatewayError::Bind(format!("{host}:{port}: {e}")))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| GatewayError::Bind(e.to_string()))?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        info!(
            addr = %local_addr,
            node = %self.gateway.node_address(),
            "node API listening"
        );

        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = &result {
                error!(error = %e, "node API server failed");
            }
            result
        });

        Ok(RunningGateway {
            local_addr,
            shutdown_tx: Some(shutdown_tx),
            handle,
        })
    }
}

/// Handle to a serving node API.
pub struct RunningGateway {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl RunningGateway {
    /// Address actually bound (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for in-flight requests.
    ///
    /// # Errors
    ///
    /// `GatewayError::Serve` if the server task failed.
    pub async fn shutdown(mut self) -> Result<(), GatewayError> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        match self.handle.await {
            Ok(Ok(())) => {
                info!(addr = %self.local_addr, "node API stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(GatewayError::Serve(e.to_string())),
            Err(e) => Err(GatewayError::Serve(e.to_string())),
        }
    }
}
