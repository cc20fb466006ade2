//! Startup configuration.
//!
//! Fail fast: an invalid configuration is fatal at startup, unlike on reload.

use std::path::Path;

use crate::config::validation::validate_config;
use crate::config::{load_config, ConfigError, ServiceConfig};

/// Load the startup configuration from `path`, or validated defaults.
pub fn startup_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = ServiceConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}
