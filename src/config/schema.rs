//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the fan-out service.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Configuration registry endpoint and namespace.
    pub registry: RegistryConfig,

    /// Fan-out dispatch settings.
    pub fanout: FanoutConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub api: ApiConfig,

    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:59890").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:59890".to_string(),
        }
    }
}

/// Registry endpoint and key namespace.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RegistryConfig {
    /// Registry implementation (currently only "consul").
    #[serde(rename = "type")]
    pub registry_type: String,

    /// URL scheme ("http" or "https").
    pub protocol: String,

    pub host: String,

    pub port: u16,

    /// Root of the core configuration tree (e.g., "edgex/core/").
    pub config_stem: String,

    /// Major version segment appended to the stem (e.g., "2.0/").
    pub config_version: String,

    /// Optional ACL token presented on every request.
    pub access_token: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            registry_type: "consul".to_string(),
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            port: 8500,
            config_stem: "edgex/core/".to_string(),
            config_version: "2.0/".to_string(),
            access_token: None,
            timeout_secs: 10,
        }
    }
}

impl RegistryConfig {
    /// Endpoint root, e.g. `http://localhost:8500/`.
    pub fn url(&self) -> String {
        format!("{}://{}:{}/", self.protocol, self.host, self.port)
    }

    /// Key prefix of `service`'s configuration: `<stem><version><service>/`.
    pub fn base_path(&self, service: &str) -> String {
        let mut path = String::new();
        for segment in [self.config_stem.as_str(), self.config_version.as_str(), service] {
            let segment = segment.trim_matches('/');
            if !segment.is_empty() {
                path.push_str(segment);
                path.push('/');
            }
        }
        path
    }
}

/// How service calls are dispatched.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FanoutMode {
    /// One service at a time, in request order.
    #[default]
    Sequential,
    /// Up to `max_concurrency` services in flight.
    Concurrent,
}

/// Fan-out dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FanoutConfig {
    pub mode: FanoutMode,

    /// Maximum in-flight service calls in concurrent mode.
    pub max_concurrency: usize,

    /// Stop starting new service calls after this many seconds.
    pub deadline_secs: Option<u64>,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            mode: FanoutMode::Sequential,
            max_concurrency: 8,
            deadline_secs: None,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// API access configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct ApiConfig {
    /// Bearer token required on configuration writes. Open when unset.
    pub api_key: Option<String>,
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024,
        }
    }
}
