//! User service.
//!
//! CRUD over a `users` table, plus a background loop that keeps the shared
//! database connection alive.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request           ┌───────────────────────────────────────────────┐
//!     ─────────────────────────┼─▶ http::server ─▶ http::users ─▶ db::users    │
//!                              │                                      │        │
//!                              │                                      ▼        │
//!                              │                             db::ConnectionHandle
//!                              │                                      ▲        │
//!                              │                                      │ replace│
//!                              │   health::active (timer) ─▶ health::database  │
//!                              │        probe / recover                        │
//!                              │                                               │
//!                              │   config · lifecycle · observability          │
//!                              └───────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod db;
pub mod http;

// Supervision
pub mod health;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use db::ConnectionHandle;
pub use health::{HealthMonitor, HealthTarget};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
