//! Configuration registry clients.
//!
//! # Data Flow
//! ```text
//! Executor (one call per target service)
//!     → RegistryClientFactory::create(service, RegistryConfig)
//!     → Box<dyn RegistryClient> scoped to <stem><version><service>/
//!     → exists(path) / put(path, value)
//! ```
//!
//! # Design Decisions
//! - Only two capabilities are consumed: existence check and overwrite
//! - A new client is built for every call; nothing is pooled
//! - Endpoint settings are passed in explicitly, never read from globals

pub mod consul;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use crate::config::schema::RegistryConfig;
pub use consul::{ConsulClient, DefaultClientFactory};
pub use memory::InMemoryRegistry;

/// Registry type handled by [`ConsulClient`].
pub const CONSUL_REGISTRY_TYPE: &str = "consul";

/// Errors reported by a registry client.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The configured endpoint does not form a valid URL.
    #[error("invalid registry endpoint '{0}'")]
    InvalidEndpoint(String),

    /// The key would escape or alias the service's subtree.
    #[error("invalid registry key '{0}'")]
    InvalidKey(String),

    /// No client implementation exists for this registry type.
    #[error("unsupported registry type '{0}'")]
    UnsupportedType(String),

    /// A session for this service was refused.
    #[error("registry session refused for service '{0}'")]
    SessionRefused(String),

    /// The HTTP transport failed.
    #[error("registry transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The existence check returned an unexpected status.
    #[error("unable to check existence of {path} in registry: status {status}")]
    ExistsStatus { path: String, status: u16 },

    /// The registry did not accept the write.
    #[error("unable to put value for {path} into registry: {reason}")]
    PutRejected { path: String, reason: String },

    /// An injected or backend-specific failure.
    #[error("{0}")]
    Backend(String),
}

/// Key/value access to one service's configuration subtree.
///
/// Paths are relative to the service's base path and use `/` separators.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Whether a value is stored at `path`.
    async fn exists(&self, path: &str) -> Result<bool, RegistryError>;

    /// Overwrite the value stored at `path`.
    async fn put(&self, path: &str, value: &[u8]) -> Result<(), RegistryError>;
}

/// Builds registry clients bound to one service identity and endpoint.
pub trait RegistryClientFactory: Send + Sync {
    fn create(
        &self,
        service: &str,
        config: &RegistryConfig,
    ) -> Result<Box<dyn RegistryClient>, RegistryError>;
}
