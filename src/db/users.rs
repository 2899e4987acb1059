//! User persistence.
//!
//! Every operation loads the handle's current connection at call time, so a
//! repository built once at startup follows each connection the health check
//! installs.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;

use crate::db::{ConnectionHandle, DbError};

/// A row of the `users` table.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            username: row.get("username")?,
            password: row.get("password")?,
            email: row.get("email")?,
            birthdate: row.get("birthdate")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

const SELECT_USER: &str =
    "SELECT id, username, password, email, birthdate, created_at, updated_at FROM users";

/// Repository over the `users` table.
#[derive(Debug, Clone)]
pub struct UserRepository {
    handle: ConnectionHandle,
}

impl UserRepository {
    pub fn new(handle: ConnectionHandle) -> Self {
        Self { handle }
    }

    /// The handle this repository reads through.
    pub fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }

    /// Liveness of the current connection: false when unset or the ping fails.
    pub fn ping(&self) -> bool {
        match self.handle.current() {
            Some(db) => db.ping().is_ok(),
            None => false,
        }
    }

    /// Insert a user, returning the stored row.
    pub fn create(&self, username: &str, password: &str) -> Result<User, DbError> {
        let created_at = Utc::now();
        let id = self.handle.get()?.with_conn(|conn| {
            conn.query_row(
                "INSERT INTO users (username, password, created_at) VALUES (?1, ?2, ?3) RETURNING id",
                params![username, password, created_at],
                |row| row.get::<_, i64>(0),
            )
        })?;

        Ok(User {
            id,
            username: username.to_string(),
            password: password.to_string(),
            email: None,
            birthdate: None,
            created_at,
            updated_at: None,
        })
    }

    pub fn find_by_id(&self, id: i64) -> Result<User, DbError> {
        self.handle
            .get()?
            .with_conn(|conn| {
                conn.query_row(
                    &format!("{SELECT_USER} WHERE id = ?1"),
                    params![id],
                    User::from_row,
                )
                .optional()
            })?
            .ok_or(DbError::NotFound)
    }

    pub fn find_by_username(&self, username: &str) -> Result<User, DbError> {
        self.handle
            .get()?
            .with_conn(|conn| {
                conn.query_row(
                    &format!("{SELECT_USER} WHERE username = ?1"),
                    params![username],
                    User::from_row,
                )
                .optional()
            })?
            .ok_or(DbError::NotFound)
    }

    /// Overwrite email and birthdate (absent values are stored as NULL).
    pub fn update_details(
        &self,
        id: i64,
        email: Option<&str>,
        birthdate: Option<&str>,
    ) -> Result<User, DbError> {
        let updated_at = Utc::now();
        let changed = self.handle.get()?.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET email = ?1, birthdate = ?2, updated_at = ?3 WHERE id = ?4",
                params![email, birthdate, updated_at, id],
            )
        })?;

        if changed == 0 {
            return Err(DbError::NotFound);
        }
        self.find_by_id(id)
    }

    /// Delete a user. Deleting a missing id is not an error.
    pub fn delete_by_id(&self, id: i64) -> Result<(), DbError> {
        if id == 0 {
            return Err(DbError::MissingId);
        }

        self.handle
            .get()?
            .with_conn(|conn| conn.execute("DELETE FROM users WHERE id = ?1", params![id]))?;
        Ok(())
    }
}
