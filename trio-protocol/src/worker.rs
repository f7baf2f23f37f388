//! The Worker Client protocol: how the coordinator reaches a worker.

use crate::{Arguments, CapabilityDescriptor, DurationMs, InvocationError, InvocationResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// A boxed, `Send` future. Used where dyn-compatible async is needed
/// without `async-trait` (capability handlers).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The three pipeline roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerRole {
    /// Observes the board.
    Scout,
    /// Chooses a move.
    Strategist,
    /// Turns the chosen move into an action.
    Executor,
}

impl WorkerRole {
    /// All roles in pipeline order.
    pub const ALL: [WorkerRole; 3] = [Self::Scout, Self::Strategist, Self::Executor];

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scout => "scout",
            Self::Strategist => "strategist",
            Self::Executor => "executor",
        }
    }
}

impl fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a worker is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// In-process call.
    Local,
    /// JSON-RPC over the network.
    Remote,
}

/// Who a client talks to. Fixed at wiring time, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerIdentity {
    /// Pipeline role of the worker.
    pub role: WorkerRole,
    /// Transport in use.
    pub transport: TransportKind,
    /// Where the worker lives: a URL for remote workers, a label for local ones.
    pub endpoint_ref: String,
}

impl WorkerIdentity {
    /// Create a new identity.
    pub fn new(role: WorkerRole, transport: TransportKind, endpoint_ref: impl Into<String>) -> Self {
        Self {
            role,
            transport,
            endpoint_ref: endpoint_ref.into(),
        }
    }
}

impl fmt::Display for WorkerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let transport = match self.transport {
            TransportKind::Local => "local",
            TransportKind::Remote => "remote",
        };
        write!(f, "{}@{}({})", self.role, transport, self.endpoint_ref)
    }
}

/// Transport-agnostic handle to one worker.
///
/// Implementations:
/// - `LocalClient`: direct call into an in-process endpoint
/// - `RemoteClient`: JSON-RPC 2.0 over HTTP POST
/// - scripted clients in [`crate::test_utils`] (feature `test-utils`)
///
/// Every method is bounded by its deadline: when it expires the client
/// stops waiting and answers `Timeout`. Deadlines are soft; work already
/// running on the worker is not killed.
#[async_trait]
pub trait WorkerClient: Send + Sync {
    /// Who this client talks to.
    fn identity(&self) -> &WorkerIdentity;

    /// Invoke a capability by name. Never panics and never returns an
    /// error out-of-band: every failure is a `Failure` response.
    async fn call(
        &self,
        capability: &str,
        arguments: Arguments,
        deadline: DurationMs,
    ) -> InvocationResponse;

    /// Discover the worker's capabilities.
    async fn list_capabilities(
        &self,
        deadline: DurationMs,
    ) -> Result<Vec<CapabilityDescriptor>, InvocationError>;

    /// Describe one capability.
    async fn describe(
        &self,
        name: &str,
        deadline: DurationMs,
    ) -> Result<CapabilityDescriptor, InvocationError>;
}
