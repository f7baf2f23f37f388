//! In-process worker client.

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use trio_capability::CapabilityContext;
use trio_protocol::{
    Arguments, CapabilityDescriptor, DurationMs, InvocationError, InvocationResponse,
    RequestIdGen, TransportKind, WorkerClient, WorkerIdentity,
};
use trio_worker::WorkerEndpoint;

/// Calls a [`WorkerEndpoint`] living in the same process.
///
/// Each call runs on its own task and is raced against the deadline. When
/// the deadline wins the client answers `Timeout` and cancels the call's
/// [`CancellationToken`]; the task keeps running until the handler returns
/// or notices the token.
#[derive(Debug)]
pub struct LocalClient {
    identity: WorkerIdentity,
    endpoint: Arc<WorkerEndpoint>,
    ids: RequestIdGen,
}

impl LocalClient {
    /// Wrap a shared endpoint.
    pub fn new(endpoint: Arc<WorkerEndpoint>) -> Self {
        let role = endpoint.role();
        Self {
            identity: WorkerIdentity::new(role, TransportKind::Local, format!("in-process:{role}")),
            endpoint,
            ids: RequestIdGen::new(),
        }
    }

    /// The endpoint this client calls.
    pub fn endpoint(&self) -> &Arc<WorkerEndpoint> {
        &self.endpoint
    }
}

#[async_trait]
impl WorkerClient for LocalClient {
    fn identity(&self) -> &WorkerIdentity {
        &self.identity
    }

    async fn call(
        &self,
        capability: &str,
        arguments: Arguments,
        deadline: DurationMs,
    ) -> InvocationResponse {
        let token = CancellationToken::new();
        let ctx = CapabilityContext::new(self.ids.next_id(), deadline).with_cancellation(token.clone());
        let endpoint = Arc::clone(&self.endpoint);
        let name = capability.to_string();
        let task = tokio::spawn(async move { endpoint.invoke(&name, arguments, ctx).await });

        match tokio::time::timeout(deadline.to_std(), task).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => InvocationError::handler(format!("worker task failed: {e}")).into(),
            Err(_) => {
                token.cancel();
                tracing::debug!(worker = %self.identity, capability, %deadline, "local call timed out");
                InvocationError::timeout(deadline).into()
            }
        }
    }

    async fn list_capabilities(
        &self,
        _deadline: DurationMs,
    ) -> Result<Vec<CapabilityDescriptor>, InvocationError> {
        Ok(self.endpoint.list_capabilities())
    }

    async fn describe(
        &self,
        name: &str,
        _deadline: DurationMs,
    ) -> Result<CapabilityDescriptor, InvocationError> {
        self.endpoint.describe(name)
    }
}
