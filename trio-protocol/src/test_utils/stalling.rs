//! A client that answers late, or not at all.

use super::scripted_identity;
use crate::{
    Arguments, CapabilityDescriptor, DurationMs, InvocationError, InvocationResponse,
    WorkerClient, WorkerIdentity, WorkerRole,
};
use async_trait::async_trait;
use std::time::Duration;

/// A client that takes `delay` to produce `result`, racing that against
/// the caller's deadline the way a real adapter does. With a delay longer
/// than the deadline every call ends in `Timeout` after exactly the
/// deadline.
pub struct StallingClient {
    identity: WorkerIdentity,
    delay: Duration,
    result: serde_json::Value,
}

impl StallingClient {
    /// Answer `result` after `delay`.
    pub fn new(role: WorkerRole, delay: Duration, result: serde_json::Value) -> Self {
        Self {
            identity: scripted_identity(role, "stalling"),
            delay,
            result,
        }
    }

    /// Never answer within any reasonable deadline.
    pub fn hung(role: WorkerRole) -> Self {
        Self::new(role, Duration::from_secs(3600), serde_json::Value::Null)
    }

    async fn wait(&self, deadline: DurationMs) -> Result<(), InvocationError> {
        tokio::time::timeout(deadline.to_std(), tokio::time::sleep(self.delay))
            .await
            .map_err(|_| InvocationError::timeout(deadline))
    }
}

#[async_trait]
impl WorkerClient for StallingClient {
    fn identity(&self) -> &WorkerIdentity {
        &self.identity
    }

    async fn call(
        &self,
        _capability: &str,
        _arguments: Arguments,
        deadline: DurationMs,
    ) -> InvocationResponse {
        match self.wait(deadline).await {
            Ok(()) => InvocationResponse::success(self.result.clone()),
            Err(e) => e.into(),
        }
    }

    async fn list_capabilities(
        &self,
        deadline: DurationMs,
    ) -> Result<Vec<CapabilityDescriptor>, InvocationError> {
        self.wait(deadline).await?;
        Ok(vec![])
    }

    async fn describe(
        &self,
        name: &str,
        deadline: DurationMs,
    ) -> Result<CapabilityDescriptor, InvocationError> {
        self.wait(deadline).await?;
        Err(InvocationError::not_found(name))
    }
}
