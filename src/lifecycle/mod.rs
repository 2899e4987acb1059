//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Init logging → Open database → Spawn health loop → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Cancel token → Stop accepting + health loop exits
//!     → Drain requests → Close database → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - One root token; each task holds a child token
//! - Fail fast at startup: no initial connection, no service

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{start, App, StartupError};
