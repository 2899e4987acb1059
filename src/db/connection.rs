//! A single SQLite connection.
//!
//! # Responsibilities
//! - Open a connection from a `DatabaseConfig` and verify it with a ping
//! - Apply pragmas and the `users` schema on open
//! - Serialize access to the underlying `rusqlite::Connection`
//! - Support an explicit, idempotent close
//!
//! # Design Decisions
//! - The connection sits behind a `Mutex<Option<_>>` so close is observable
//!   by every holder: after close each call fails with `DbError::Closed`
//! - All calls are blocking; async callers go through `spawn_blocking`

use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

use crate::config::DatabaseConfig;
use crate::db::DbError;

const PRAGMAS: &str = "
    PRAGMA busy_timeout = 5000;
    PRAGMA journal_mode = WAL;
    PRAGMA synchronous = NORMAL;
    PRAGMA foreign_keys = ON;
";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        username    TEXT NOT NULL UNIQUE,
        password    TEXT NOT NULL,
        email       TEXT,
        birthdate   TEXT,
        created_at  TEXT NOT NULL,
        updated_at  TEXT
    );
";

/// A live (or closed) database connection.
#[derive(Debug)]
pub struct Database {
    url: String,
    conn: Mutex<Option<Connection>>,
}

impl Database {
    /// Open a connection, ping it and apply the schema.
    pub fn open(config: &DatabaseConfig) -> Result<Self, DbError> {
        let path = sqlite_path(&config.url);
        let open_err = |source: rusqlite::Error| DbError::Open {
            url: config.url.clone(),
            source,
        };

        let conn = Connection::open(path).map_err(open_err)?;
        conn.execute_batch(PRAGMAS).map_err(open_err)?;
        conn.execute_batch(SCHEMA).map_err(open_err)?;

        let db = Self {
            url: config.url.clone(),
            conn: Mutex::new(Some(conn)),
        };
        db.ping()?;

        tracing::info!(url = %db.url, "Database connected");
        Ok(db)
    }

    /// The URL this connection was opened from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Lightweight connectivity check.
    pub fn ping(&self) -> Result<(), DbError> {
        self.with_conn(|conn| conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)))
            .map(|_| ())
    }

    /// Run `f` against the open connection.
    pub fn with_conn<T, F>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or(DbError::Closed)?;
        Ok(f(conn)?)
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().map(|guard| guard.is_none()).unwrap_or(true)
    }

    /// Close the connection. Closing twice is a no-op.
    pub fn close(&self) -> Result<(), DbError> {
        let conn = self.lock()?.take();
        match conn {
            // On failure rusqlite hands the connection back; dropping it finalizes anyway.
            Some(conn) => conn.close().map_err(|(_, e)| DbError::Sqlite(e)),
            None => Ok(()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Connection>>, DbError> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }
}

/// Strip a `sqlite:` scheme from a URL, leaving the filesystem path.
pub fn sqlite_path(url: &str) -> &str {
    url.strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &tempfile::TempDir) -> DatabaseConfig {
        DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("users.db").display()),
        }
    }

    #[test]
    fn test_sqlite_path() {
        assert_eq!(sqlite_path("sqlite:///tmp/a.db"), "/tmp/a.db");
        assert_eq!(sqlite_path("sqlite://users.db"), "users.db");
        assert_eq!(sqlite_path("sqlite:users.db"), "users.db");
        assert_eq!(sqlite_path(":memory:"), ":memory:");
        assert_eq!(sqlite_path("/srv/users.db"), "/srv/users.db");
    }

    #[test]
    fn test_open_and_ping() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&config_in(&dir)).unwrap();
        assert!(db.ping().is_ok());
        assert!(!db.is_closed());
    }

    #[test]
    fn test_open_in_memory() {
        let db = Database::open(&DatabaseConfig {
            url: ":memory:".into(),
        })
        .unwrap();
        assert!(db.ping().is_ok());
    }

    #[test]
    fn test_close_is_idempotent_and_fails_ping() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&config_in(&dir)).unwrap();

        db.close().unwrap();
        db.close().unwrap();

        assert!(db.is_closed());
        assert!(matches!(db.ping(), Err(DbError::Closed)));
    }

    #[test]
    fn test_open_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            url: dir
                .path()
                .join("missing")
                .join("users.db")
                .display()
                .to_string(),
        };

        assert!(matches!(Database::open(&config), Err(DbError::Open { .. })));
    }
}
