//! Bounded access to the completion endpoint.
//!
//! Model latency dominates request latency, so calls are allowed to overlap,
//! but only up to a fixed number at once. Each call gets exactly one attempt
//! under a timeout; there is no retry.

use crate::backend::{CompletionBackend, CompletionRequest, CompletionResponse};
use crate::error::LlmError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Limits applied to model calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelGateConfig {
    /// Maximum number of model calls in flight at once.
    pub max_concurrent_calls: usize,
    /// Timeout for a single call, in milliseconds.
    pub call_timeout_ms: u64,
}

impl Default for ModelGateConfig {
    fn default() -> Self {
        Self {
            max_concurrent_calls: 3,
            call_timeout_ms: 8_000,
        }
    }
}

/// Semaphore-plus-timeout wrapper shared by every model-calling analyzer.
///
/// Cloning is cheap and clones share the same permits.
#[derive(Debug, Clone)]
pub struct ModelGate {
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl ModelGate {
    /// Creates a gate from its configuration.
    ///
    /// A zero concurrency limit is raised to one so calls can still proceed.
    #[must_use]
    pub fn new(config: &ModelGateConfig) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(config.max_concurrent_calls.max(1))),
            timeout: Duration::from_millis(config.call_timeout_ms),
        }
    }

    /// Returns the number of calls that could start right now.
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Runs one completion through the gate.
    ///
    /// The timeout covers the call itself, not the wait for a permit.
    ///
    /// # Errors
    ///
    /// Returns the backend's error, or [`LlmError::Timeout`] if the call
    /// exceeds the configured budget.
    pub async fn complete(
        &self,
        backend: &dyn CompletionBackend,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| LlmError::ProviderUnavailable {
                provider: backend.model().to_string(),
                reason: "model gate closed".to_string(),
            })?;

        match tokio::time::timeout(self.timeout, backend.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout {
                after_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}
