//! Per-service configuration update.
//!
//! # Responsibilities
//! - Translate the dotted key into a registry path
//! - Open a registry session as the target service
//! - Refuse to create keys: only existing keys are overwritten
//! - Log every failure and fold it into a `ServiceOutcome`

use async_trait::async_trait;
use std::sync::Arc;

use crate::fanout::types::{ConfigChangeRequest, ServiceOutcome, SetError};
use crate::observability::metrics;
use crate::registry::{RegistryClientFactory, RegistryConfig};

/// Applies one change to one service.
///
/// Implementations never fail: every error is reported through the returned
/// outcome.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, service: &str, request: &ConfigChangeRequest) -> ServiceOutcome;
}

/// Executor backed by the configuration registry.
pub struct RegistryExecutor {
    factory: Arc<dyn RegistryClientFactory>,
    config: RegistryConfig,
}

impl RegistryExecutor {
    pub fn new(factory: Arc<dyn RegistryClientFactory>, config: RegistryConfig) -> Self {
        Self { factory, config }
    }

    async fn apply(&self, service: &str, request: &ConfigChangeRequest) -> Result<(), SetError> {
        let path = request.registry_path();

        let client = self.factory.create(service, &self.config).map_err(|e| {
            tracing::error!(service = %service, error = %e, "unable to create new registry client");
            SetError::SessionCreation
        })?;

        let exists = client.exists(&path).await.map_err(|e| {
            tracing::error!(service = %service, path = %path, error = %e, "registry existence check failed");
            SetError::ExistenceCheck(e.to_string())
        })?;

        if !exists {
            tracing::error!(service = %service, path = %path, "key does not exist");
            return Err(SetError::KeyNotFound);
        }

        client.put(&path, request.value.as_bytes()).await.map_err(|e| {
            tracing::error!(service = %service, path = %path, error = %e, "unable to update key");
            SetError::Write
        })?;

        tracing::debug!(service = %service, path = %path, "configuration updated");
        Ok(())
    }
}

#[async_trait]
impl Executor for RegistryExecutor {
    async fn execute(&self, service: &str, request: &ConfigChangeRequest) -> ServiceOutcome {
        let result = self.apply(service, request).await;
        metrics::record_outcome(result.as_ref().err());
        ServiceOutcome::from(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{InMemoryRegistry, RegistryClient, RegistryError};
    use std::sync::Mutex;

    const KEY_PATH: &str = "edgex/core/2.0/edgex-core-data/Writable/LogLevel";

    fn executor(registry: &InMemoryRegistry) -> RegistryExecutor {
        RegistryExecutor::new(Arc::new(registry.clone()), RegistryConfig::default())
    }

    fn log_level(value: &str) -> ConfigChangeRequest {
        ConfigChangeRequest::new("Writable.LogLevel", value)
    }

    /// Records every path the executor hands to the client.
    #[derive(Default, Clone)]
    struct RecordingFactory {
        paths: Arc<Mutex<Vec<String>>>,
    }

    struct RecordingClient {
        paths: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl RegistryClient for RecordingClient {
        async fn exists(&self, path: &str) -> Result<bool, RegistryError> {
            self.paths.lock().unwrap().push(path.to_string());
            Ok(true)
        }

        async fn put(&self, path: &str, _value: &[u8]) -> Result<(), RegistryError> {
            self.paths.lock().unwrap().push(path.to_string());
            Ok(())
        }
    }

    impl RegistryClientFactory for RecordingFactory {
        fn create(
            &self,
            _service: &str,
            _config: &RegistryConfig,
        ) -> Result<Box<dyn RegistryClient>, RegistryError> {
            Ok(Box::new(RecordingClient {
                paths: self.paths.clone(),
            }))
        }
    }

    #[tokio::test]
    async fn test_happy_path_overwrites_value() {
        let registry = InMemoryRegistry::new();
        registry.seed(KEY_PATH, "INFO");

        let outcome = executor(&registry)
            .execute("edgex-core-data", &log_level("DEBUG"))
            .await;

        assert_eq!(outcome, ServiceOutcome::succeeded());
        assert_eq!(registry.get(KEY_PATH).as_deref(), Some(&b"DEBUG"[..]));
    }

    #[tokio::test]
    async fn test_registry_receives_slash_path() {
        let factory = RecordingFactory::default();
        let exec = RegistryExecutor::new(Arc::new(factory.clone()), RegistryConfig::default());

        let outcome = exec.execute("svc", &log_level("INFO")).await;

        assert!(outcome.success);
        let paths = factory.paths.lock().unwrap();
        assert_eq!(*paths, vec!["Writable/LogLevel", "Writable/LogLevel"]);
    }

    #[tokio::test]
    async fn test_missing_key_is_never_created() {
        let registry = InMemoryRegistry::new();

        let outcome = executor(&registry)
            .execute("edgex-core-data", &log_level("INFO"))
            .await;

        assert_eq!(outcome, ServiceOutcome::failed("key does not exist"));
        assert_eq!(registry.put_count(), 0);
        assert!(registry.get(KEY_PATH).is_none());
    }

    #[tokio::test]
    async fn test_session_failure() {
        let registry = InMemoryRegistry::new();
        registry.seed(KEY_PATH, "INFO");
        registry.refuse_sessions_for("edgex-core-data");

        let outcome = executor(&registry)
            .execute("edgex-core-data", &log_level("DEBUG"))
            .await;

        assert_eq!(
            outcome,
            ServiceOutcome::failed("unable to create new registry client")
        );
        assert_eq!(registry.get(KEY_PATH).as_deref(), Some(&b"INFO"[..]));
    }

    #[tokio::test]
    async fn test_existence_check_error_text_is_reported() {
        let registry = InMemoryRegistry::new();
        registry.fail_exists_for("edgex-core-data", "connection refused");

        let outcome = executor(&registry)
            .execute("edgex-core-data", &log_level("DEBUG"))
            .await;

        assert_eq!(outcome, ServiceOutcome::failed("connection refused"));
        assert_eq!(registry.put_count(), 0);
    }

    #[tokio::test]
    async fn test_write_failure() {
        let registry = InMemoryRegistry::new();
        registry.seed(KEY_PATH, "INFO");
        registry.fail_puts_for("edgex-core-data");

        let outcome = executor(&registry)
            .execute("edgex-core-data", &log_level("DEBUG"))
            .await;

        assert_eq!(outcome, ServiceOutcome::failed("unable to update key"));
        assert_eq!(registry.put_count(), 1);
    }

    #[tokio::test]
    async fn test_new_session_per_call() {
        let registry = InMemoryRegistry::new();
        registry.seed(KEY_PATH, "INFO");
        let exec = executor(&registry);

        exec.execute("edgex-core-data", &log_level("DEBUG")).await;
        exec.execute("edgex-core-data", &log_level("WARN")).await;

        assert_eq!(registry.session_count(), 2);
        assert_eq!(registry.get(KEY_PATH).as_deref(), Some(&b"WARN"[..]));
    }
}
