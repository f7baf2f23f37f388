//! Clients that never succeed.

use super::scripted_identity;
use crate::{
    Arguments, CapabilityDescriptor, DurationMs, ErrorKind, InvocationError, InvocationResponse,
    WorkerClient, WorkerIdentity, WorkerRole,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A client whose every call fails with the chosen error kind.
pub struct FailingClient {
    identity: WorkerIdentity,
    kind: ErrorKind,
    calls: AtomicUsize,
}

impl FailingClient {
    /// Fail every call with `kind`.
    pub fn new(role: WorkerRole, kind: ErrorKind) -> Self {
        Self {
            identity: scripted_identity(role, kind.as_str()),
            kind,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `call` invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn error(&self) -> InvocationError {
        InvocationError::new(self.kind, format!("scripted {}", self.kind))
    }
}

#[async_trait]
impl WorkerClient for FailingClient {
    fn identity(&self) -> &WorkerIdentity {
        &self.identity
    }

    async fn call(
        &self,
        _capability: &str,
        _arguments: Arguments,
        _deadline: DurationMs,
    ) -> InvocationResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.error().into()
    }

    async fn list_capabilities(
        &self,
        _deadline: DurationMs,
    ) -> Result<Vec<CapabilityDescriptor>, InvocationError> {
        Err(self.error())
    }

    async fn describe(
        &self,
        _name: &str,
        _deadline: DurationMs,
    ) -> Result<CapabilityDescriptor, InvocationError> {
        Err(self.error())
    }
}

/// A worker that cannot be reached: every call is a `TransportError`.
pub struct UnreachableClient;

impl UnreachableClient {
    /// An unreachable worker in the given role.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(role: WorkerRole) -> FailingClient {
        FailingClient::new(role, ErrorKind::TransportError)
    }
}
