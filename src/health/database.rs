//! Database probe and recovery.
//!
//! # Responsibilities
//! - Probe: false when the handle is unset or `SELECT 1` fails
//! - Recover: open a fresh connection and swap it into the shared handle
//!
//! # Design Decisions
//! - The new connection is opened before the old one is touched; a failed
//!   open leaves the handle exactly as it was and the next tick retries
//! - The previous connection is never closed explicitly: readers that loaded
//!   it before the swap finish on it, and the last one to drop it closes it
//! - Recovery on a healthy handle is allowed and simply reconnects

use tokio_util::sync::CancellationToken;

use crate::config::DatabaseConfig;
use crate::db::{ConnectionHandle, Database};
use crate::health::target::HealthTarget;
use crate::observability::metrics;

/// Supervises the shared database connection.
#[derive(Debug, Clone)]
pub struct DatabaseTarget {
    handle: ConnectionHandle,
    config: DatabaseConfig,
}

impl DatabaseTarget {
    pub fn new(handle: ConnectionHandle, config: DatabaseConfig) -> Self {
        Self { handle, config }
    }

    pub fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }
}

impl HealthTarget for DatabaseTarget {
    fn probe(&self) -> bool {
        let Some(db) = self.handle.current() else {
            tracing::warn!("Database handle is not set");
            return false;
        };

        match db.ping() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(url = %db.url(), error = %e, "Database ping failed");
                false
            }
        }
    }

    fn recover(&self, _cancel: &CancellationToken) -> bool {
        let fresh = match Database::open(&self.config) {
            Ok(db) => db,
            Err(e) => {
                metrics::record_reconnect("failed");
                tracing::error!(error = %e, "Database recovery failed");
                return false;
            }
        };

        if let Some(previous) = self.handle.replace(fresh) {
            tracing::debug!(
                url = %previous.url(),
                in_use = std::sync::Arc::strong_count(&previous) - 1,
                "Previous connection retired"
            );
        }

        metrics::record_reconnect("ok");
        tracing::info!("DB recovered successfully");
        true
    }
}
