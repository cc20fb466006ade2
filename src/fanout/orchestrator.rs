//! Fan-out of one change across many services.
//!
//! # Responsibilities
//! - Invoke the executor once per requested service
//! - Keep each service's outcome independent of the others
//! - Reduce per-index outcomes into a `ResultSet` (last duplicate wins)
//! - Stop launching new calls once the optional deadline has passed

use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::schema::{FanoutConfig, FanoutMode};
use crate::fanout::executor::Executor;
use crate::fanout::types::{ConfigChangeRequest, ResultSet, ServiceName, ServiceOutcome, SetError};
use crate::observability::metrics;

/// Dispatches a change to every service and collects the outcomes.
#[derive(Clone)]
pub struct Orchestrator {
    executor: Arc<dyn Executor>,
    mode: FanoutMode,
    max_concurrency: usize,
    deadline: Option<Duration>,
}

impl Orchestrator {
    /// Sequential orchestrator without a deadline.
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self {
            executor,
            mode: FanoutMode::Sequential,
            max_concurrency: 1,
            deadline: None,
        }
    }

    pub fn from_config(executor: Arc<dyn Executor>, config: &FanoutConfig) -> Self {
        let mut orchestrator =
            Self::new(executor).with_mode(config.mode, config.max_concurrency);
        if let Some(secs) = config.deadline_secs {
            orchestrator = orchestrator.with_deadline(Duration::from_secs(secs));
        }
        orchestrator
    }

    pub fn with_mode(mut self, mode: FanoutMode, max_concurrency: usize) -> Self {
        self.mode = mode;
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// No new service call starts once `deadline` has elapsed.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Apply `request` to every service in `services`.
    pub async fn set(&self, services: &[ServiceName], request: &ConfigChangeRequest) -> ResultSet {
        if services.is_empty() {
            return ResultSet::new();
        }

        let deadline = self.deadline.map(|d| Instant::now() + d);
        tracing::info!(
            services = services.len(),
            key = %request.key,
            mode = ?self.mode,
            "Fanning out configuration change"
        );

        let outcomes = match self.mode {
            FanoutMode::Sequential => self.dispatch_sequential(services, request, deadline).await,
            FanoutMode::Concurrent => self.dispatch_concurrent(services, request, deadline).await,
        };

        // One slot per input index; later duplicates overwrite earlier ones.
        services.iter().cloned().zip(outcomes).collect()
    }

    async fn dispatch_sequential(
        &self,
        services: &[ServiceName],
        request: &ConfigChangeRequest,
        deadline: Option<Instant>,
    ) -> Vec<ServiceOutcome> {
        let mut outcomes = Vec::with_capacity(services.len());
        for service in services {
            outcomes.push(self.dispatch_one(service, request, deadline).await);
        }
        outcomes
    }

    async fn dispatch_concurrent(
        &self,
        services: &[ServiceName],
        request: &ConfigChangeRequest,
        deadline: Option<Instant>,
    ) -> Vec<ServiceOutcome> {
        // Built up front so the stream holds no borrowing closure.
        let calls: Vec<_> = services
            .iter()
            .map(|service| self.dispatch_one(service, request, deadline))
            .collect();

        // `buffered` yields results in input order.
        stream::iter(calls)
            .buffered(self.max_concurrency)
            .collect()
            .await
    }

    async fn dispatch_one(
        &self,
        service: &str,
        request: &ConfigChangeRequest,
        deadline: Option<Instant>,
    ) -> ServiceOutcome {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            tracing::warn!(service = %service, "Deadline passed, service not attempted");
            let err = SetError::Cancelled;
            metrics::record_outcome(Some(&err));
            return ServiceOutcome::from(Err(err));
        }
        self.executor.execute(service, request).await
    }
}
