//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the initial database connection
//! - Start the health check loop as a background task
//! - Bind the listener and begin serving
//! - On shutdown: drain HTTP, wait for the loop, close the connection
//!
//! # Design Decisions
//! - Fail fast: no initial connection means no service
//! - The loop and the server share one `ConnectionHandle` and one shutdown token

use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::ServiceConfig;
use crate::db::{ConnectionHandle, Database, DbError};
use crate::health::{DatabaseTarget, HealthMonitor, HealthStatus};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("initial database connection failed: {0}")]
    Database(#[from] DbError),

    #[error("listener error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A running service.
pub struct App {
    handle: ConnectionHandle,
    health: Arc<HealthStatus>,
    local_addr: SocketAddr,
    server: JoinHandle<Result<(), std::io::Error>>,
    monitor: Option<JoinHandle<()>>,
    monitor_cancel: CancellationToken,
}

/// Open the database, spawn the health loop and start serving.
pub async fn start(config: ServiceConfig, shutdown: &Shutdown) -> Result<App, StartupError> {
    let db = Database::open(&config.database)?;
    let handle = ConnectionHandle::new(db);
    let health = Arc::new(HealthStatus::new());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let monitor_cancel = shutdown.token();
    let monitor = if config.health_check.enabled {
        let target = DatabaseTarget::new(handle.clone(), config.database.clone());
        let monitor = HealthMonitor::from_config(&config.health_check, target)
            .with_status(health.clone());
        Some(monitor.spawn(monitor_cancel.clone()))
    } else {
        tracing::info!("Database health check disabled");
        None
    };

    let server = HttpServer::new(config, handle.clone(), health.clone());
    let server = tokio::spawn(server.run(listener, shutdown.token()));

    Ok(App {
        handle,
        health,
        local_addr,
        server,
        monitor,
        monitor_cancel,
    })
}

impl App {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }

    pub fn health(&self) -> Arc<HealthStatus> {
        self.health.clone()
    }

    /// Wait for the server and the health loop to finish, then close the database.
    pub async fn wait(self) -> Result<(), StartupError> {
        let served = self.server.await;
        // server gone: stop the loop too
        self.monitor_cancel.cancel();

        if let Some(monitor) = self.monitor {
            monitor.await?;
        }

        if let Some(db) = self.handle.take() {
            if let Err(e) = db.close() {
                tracing::warn!(error = %e, "Error closing database");
            }
        }

        served??;
        Ok(())
    }
}
