//! Process-local registry.
//!
//! Stores values under the same full keys Consul would use, so a seeded
//! `InMemoryRegistry` can stand in for a real registry in tests and local runs.

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::registry::{RegistryClient, RegistryClientFactory, RegistryConfig, RegistryError};

#[derive(Debug, Default)]
struct Shared {
    entries: DashMap<String, Vec<u8>>,
    refused: DashSet<String>,
    failing_exists: DashMap<String, String>,
    failing_puts: DashSet<String>,
    sessions: AtomicUsize,
    puts: AtomicUsize,
}

/// Shared in-memory key/value store with injectable failures.
///
/// Cloning is cheap; clones observe the same store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    shared: Arc<Shared>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` at a full key, e.g. `edgex/core/2.0/svc/Writable/LogLevel`.
    pub fn seed(&self, full_key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.shared.entries.insert(full_key.into(), value.into());
    }

    /// Value stored at a full key.
    pub fn get(&self, full_key: &str) -> Option<Vec<u8>> {
        self.shared.entries.get(full_key).map(|v| v.value().clone())
    }

    /// Refuse to open sessions for `service`.
    pub fn refuse_sessions_for(&self, service: impl Into<String>) {
        self.shared.refused.insert(service.into());
    }

    /// Make existence checks for `service` fail with `message`.
    pub fn fail_exists_for(&self, service: impl Into<String>, message: impl Into<String>) {
        self.shared.failing_exists.insert(service.into(), message.into());
    }

    /// Make writes for `service` fail.
    pub fn fail_puts_for(&self, service: impl Into<String>) {
        self.shared.failing_puts.insert(service.into());
    }

    /// Number of sessions opened so far.
    pub fn session_count(&self) -> usize {
        self.shared.sessions.load(Ordering::SeqCst)
    }

    /// Number of writes attempted so far.
    pub fn put_count(&self) -> usize {
        self.shared.puts.load(Ordering::SeqCst)
    }
}

impl RegistryClientFactory for InMemoryRegistry {
    fn create(
        &self,
        service: &str,
        config: &RegistryConfig,
    ) -> Result<Box<dyn RegistryClient>, RegistryError> {
        if self.shared.refused.contains(service) {
            return Err(RegistryError::SessionRefused(service.to_string()));
        }
        self.shared.sessions.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MemorySession {
            shared: self.shared.clone(),
            service: service.to_string(),
            base_path: config.base_path(service),
        }))
    }
}

struct MemorySession {
    shared: Arc<Shared>,
    service: String,
    base_path: String,
}

impl MemorySession {
    fn full_path(&self, path: &str) -> String {
        format!("{}{}", self.base_path, path)
    }
}

#[async_trait]
impl RegistryClient for MemorySession {
    async fn exists(&self, path: &str) -> Result<bool, RegistryError> {
        if let Some(message) = self.shared.failing_exists.get(&self.service) {
            return Err(RegistryError::Backend(message.value().clone()));
        }
        Ok(self.shared.entries.contains_key(&self.full_path(path)))
    }

    async fn put(&self, path: &str, value: &[u8]) -> Result<(), RegistryError> {
        self.shared.puts.fetch_add(1, Ordering::SeqCst);
        let full_path = self.full_path(path);
        if self.shared.failing_puts.contains(&self.service) {
            return Err(RegistryError::PutRejected {
                path: full_path,
                reason: "write refused".to_string(),
            });
        }
        self.shared.entries.insert(full_path, value.to_vec());
        Ok(())
    }
}
