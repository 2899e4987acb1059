//! Database subsystem.
//!
//! # Data Flow
//! ```text
//! startup:
//!     DatabaseConfig → connection.rs (open, ping, schema)
//!     → handle.rs (ConnectionHandle, shared by clone)
//!
//! request path:
//!     handler → users.rs (UserRepository)
//!     → handle.current() → Database::with_conn
//!
//! recovery (health/database.rs):
//!     Database::open → handle.replace → previous connection closed
//! ```
//!
//! # Design Decisions
//! - One shared slot, one writer (the recovery action), many readers
//! - Repositories never cache a connection; they load it per call

pub mod connection;
pub mod handle;
pub mod users;

pub use connection::Database;
pub use handle::ConnectionHandle;
pub use users::{User, UserRepository};

use thiserror::Error;

/// Errors raised by the database layer.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to open database '{url}': {source}")]
    Open {
        url: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("database connection is closed")]
    Closed,

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database connection lock poisoned")]
    Poisoned,

    #[error("record not found")]
    NotFound,

    #[error("id is required")]
    MissingId,

    #[error("blocking database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
