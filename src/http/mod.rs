//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trailing-slash normalisation)
//!     → request.rs (request ID, trace span)
//!     → users.rs (decode, validate, repository call on blocking pool)
//!     → response.rs (JSON error envelope on failure)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod users;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::{ApiError, ErrorBody};
pub use server::{AppState, HttpServer};
