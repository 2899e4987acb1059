//! Shared, replaceable connection handle.
//!
//! # Responsibilities
//! - Hold the one live `Database` for the whole process
//! - Let request handlers and the probe read it without blocking
//! - Let the recovery action install a new connection atomically
//!
//! # Design Decisions
//! - `ArcSwapOption` indirection: readers load a full `Arc<Database>`,
//!   the writer swaps the pointer, so no reader sees a partial value
//! - The handle is `Clone`; every clone shares the same slot, so
//!   long-lived holders observe a recovered connection without a new reference
//! - A replaced connection stays usable by in-flight readers until they drop it

use arc_swap::ArcSwapOption;
use std::sync::Arc;

use crate::db::{Database, DbError};

/// The process-wide database slot.
#[derive(Clone)]
pub struct ConnectionHandle {
    inner: Arc<ArcSwapOption<Database>>,
}

impl ConnectionHandle {
    /// Create a handle holding `db`.
    pub fn new(db: Database) -> Self {
        Self {
            inner: Arc::new(ArcSwapOption::from_pointee(db)),
        }
    }

    /// Create a handle with no connection installed.
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(ArcSwapOption::empty()),
        }
    }

    /// The current connection, if any.
    pub fn current(&self) -> Option<Arc<Database>> {
        self.inner.load_full()
    }

    /// The current connection, or `DbError::Closed` when unset.
    pub fn get(&self) -> Result<Arc<Database>, DbError> {
        self.current().ok_or(DbError::Closed)
    }

    /// Whether a connection is installed.
    pub fn is_set(&self) -> bool {
        self.inner.load().is_some()
    }

    /// Install `db`, returning the previous connection.
    pub fn replace(&self, db: Database) -> Option<Arc<Database>> {
        self.inner.swap(Some(Arc::new(db)))
    }

    /// Remove the current connection, leaving the handle unset.
    pub fn take(&self) -> Option<Arc<Database>> {
        self.inner.swap(None)
    }
}

impl Default for ConnectionHandle {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("url", &self.current().map(|db| db.url().to_string()))
            .finish()
    }
}
