//! Request, outcome and error types shared by the executor and orchestrator.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of a target service, as registered in the configuration registry.
pub type ServiceName = String;

/// Per-service outcomes of one fan-out call.
///
/// Holds exactly one entry per distinct service name. Iteration order is
/// unspecified.
pub type ResultSet = HashMap<ServiceName, ServiceOutcome>;

/// A single key/value change applied to every target service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConfigChangeRequest {
    /// Dotted configuration path, e.g. `Writable.LogLevel`.
    pub key: String,
    /// New value, written verbatim.
    pub value: String,
}

impl ConfigChangeRequest {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The registry path for this key: every `.` becomes `/`.
    pub fn registry_path(&self) -> String {
        self.key.replace('.', "/")
    }
}

/// Result of applying a change to one service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceOutcome {
    pub success: bool,
    /// Empty on success, otherwise the failure cause.
    pub description: String,
}

impl ServiceOutcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            description: String::new(),
        }
    }

    pub fn failed(description: impl Into<String>) -> Self {
        Self {
            success: false,
            description: description.into(),
        }
    }
}

impl From<Result<(), SetError>> for ServiceOutcome {
    fn from(result: Result<(), SetError>) -> Self {
        match result {
            Ok(()) => Self::succeeded(),
            Err(e) => Self::failed(e.to_string()),
        }
    }
}

/// Why a change could not be applied to a service.
///
/// The `Display` text of each variant is the exact `description` reported
/// back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetError {
    #[error("unable to create new registry client")]
    SessionCreation,

    /// Carries the registry's own error text.
    #[error("{0}")]
    ExistenceCheck(String),

    #[error("key does not exist")]
    KeyNotFound,

    #[error("unable to update key")]
    Write,

    /// The fan-out deadline passed before this service was attempted.
    #[error("not attempted: cancelled")]
    Cancelled,
}

impl SetError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SetError::SessionCreation => "session_creation",
            SetError::ExistenceCheck(_) => "existence_check",
            SetError::KeyNotFound => "key_not_found",
            SetError::Write => "write",
            SetError::Cancelled => "cancelled",
        }
    }
}

/// Response body for a fan-out call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SetConfigResponse {
    pub configuration: ResultSet,
}

impl From<ResultSet> for SetConfigResponse {
    fn from(configuration: ResultSet) -> Self {
        Self { configuration }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_path_replaces_every_dot() {
        let req = ConfigChangeRequest::new("Writable.LogLevel", "INFO");
        assert_eq!(req.registry_path(), "Writable/LogLevel");

        let req = ConfigChangeRequest::new("Writable.InsecureSecrets.DB.Path", "x");
        assert_eq!(req.registry_path(), "Writable/InsecureSecrets/DB/Path");

        let req = ConfigChangeRequest::new("Service", "x");
        assert_eq!(req.registry_path(), "Service");
    }

    #[test]
    fn test_outcome_from_error_uses_exact_descriptions() {
        let cases = [
            (SetError::SessionCreation, "unable to create new registry client"),
            (SetError::KeyNotFound, "key does not exist"),
            (SetError::Write, "unable to update key"),
            (SetError::Cancelled, "not attempted: cancelled"),
            (SetError::ExistenceCheck("connection refused".into()), "connection refused"),
        ];

        for (err, expected) in cases {
            let outcome = ServiceOutcome::from(Err(err));
            assert!(!outcome.success);
            assert_eq!(outcome.description, expected);
        }

        assert_eq!(ServiceOutcome::from(Ok(())), ServiceOutcome::succeeded());
    }

    #[test]
    fn test_response_json_shape() {
        let mut set = ResultSet::new();
        set.insert("edgex-core-data".into(), ServiceOutcome::succeeded());
        let body = serde_json::to_value(SetConfigResponse::from(set)).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "configuration": {
                    "edgex-core-data": { "success": true, "description": "" }
                }
            })
        );
    }

    #[test]
    fn test_request_json_shape() {
        let req: ConfigChangeRequest =
            serde_json::from_str(r#"{"key":"Writable.LogLevel","value":"DEBUG"}"#).unwrap();
        assert_eq!(req, ConfigChangeRequest::new("Writable.LogLevel", "DEBUG"));
    }
}
