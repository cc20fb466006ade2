//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Check the registry type and protocol are supported
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::registry::CONSUL_REGISTRY_TYPE;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field} '{value}': not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("unsupported registry type '{0}'")]
    UnsupportedRegistry(String),

    #[error("unsupported registry protocol '{0}'")]
    UnsupportedProtocol(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Check `config` for semantic errors.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    let registry = &config.registry;
    if registry.registry_type != CONSUL_REGISTRY_TYPE {
        errors.push(ValidationError::UnsupportedRegistry(registry.registry_type.clone()));
    }
    if !matches!(registry.protocol.as_str(), "http" | "https") {
        errors.push(ValidationError::UnsupportedProtocol(registry.protocol.clone()));
    }
    if registry.host.trim().is_empty() {
        errors.push(ValidationError::Empty("registry.host"));
    }
    if registry.port == 0 {
        errors.push(ValidationError::Zero("registry.port"));
    }
    if registry.config_stem.trim_matches('/').is_empty() {
        errors.push(ValidationError::Empty("registry.config_stem"));
    }
    if registry.timeout_secs == 0 {
        errors.push(ValidationError::Zero("registry.timeout_secs"));
    }

    if config.fanout.max_concurrency == 0 {
        errors.push(ValidationError::Zero("fanout.max_concurrency"));
    }
    if config.fanout.deadline_secs == Some(0) {
        errors.push(ValidationError::Zero("fanout.deadline_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero("security.max_body_size"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
