//! Error responses.
//!
//! # Responsibilities
//! - Map domain and database failures to HTTP status codes
//! - Render every error as the same JSON envelope
//!
//! ```text
//! { "status": 404, "message": "User not found", "timestamp": "19/10/2026 14:03:11" }
//! ```
//!
//! # Design Decisions
//! - Database internals never reach the client; they are logged and
//!   replaced by the generic message
//! - Timestamps are local time, day first

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::db::DbError;

/// Timestamp format of the error envelope.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Errors a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Id is required")]
    BlankId,

    #[error("Id must be a number")]
    InvalidId,

    #[error("User not found")]
    UserNotFound,

    #[error("Username is required")]
    BlankUsername,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("An unexpected Error Occurred.")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BlankId
            | ApiError::InvalidId
            | ApiError::BlankUsername
            | ApiError::InvalidCredentials
            | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::UserNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => ApiError::UserNotFound,
            DbError::MissingId => ApiError::BlankId,
            other => {
                tracing::error!(error = %other, "Database operation failed");
                ApiError::Internal
            }
        }
    }
}

/// The JSON error envelope.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
    pub timestamp: String,
}

impl ErrorBody {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorBody::new(status, self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_errors_map_to_api_errors() {
        assert!(matches!(ApiError::from(DbError::NotFound), ApiError::UserNotFound));
        assert!(matches!(ApiError::from(DbError::MissingId), ApiError::BlankId));
        assert!(matches!(ApiError::from(DbError::Closed), ApiError::Internal));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::BlankUsername.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::UserNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_envelope_shape() {
        let body = ErrorBody::new(StatusCode::NOT_FOUND, "User not found");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], 404);
        assert_eq!(json["message"], "User not found");

        let ts = json["timestamp"].as_str().unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).is_ok());
    }
}
