//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, timeouts > 0)
//! - Check that addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::ToSocketAddrs;
use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("database.url must not be empty")]
    EmptyDatabaseUrl,

    #[error("health_check.interval must be greater than zero")]
    ZeroInterval,

    #[error("health_check.name must not be empty")]
    EmptyCheckName,

    #[error("invalid listener.bind_address '{0}'")]
    BadBindAddress(String),

    #[error("invalid observability.metrics_address '{0}'")]
    BadMetricsAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.database.url.trim().is_empty() {
        errors.push(ValidationError::EmptyDatabaseUrl);
    }

    if config.health_check.enabled {
        if config.health_check.interval().is_zero() {
            errors.push(ValidationError::ZeroInterval);
        }
        if config.health_check.name.trim().is_empty() {
            errors.push(ValidationError::EmptyCheckName);
        }
    }

    if !resolves(&config.listener.bind_address) {
        errors.push(ValidationError::BadBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::BadMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// "localhost:8000" is accepted, so host names go through the resolver.
fn resolves(addr: &str) -> bool {
    addr.to_socket_addrs()
        .map(|mut addrs| addrs.next().is_some())
        .unwrap_or(false)
}
