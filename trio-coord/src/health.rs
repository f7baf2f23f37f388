//! Worker health as seen from the coordinator.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;
use trio_protocol::{CoordinationMode, InvocationError, WorkerIdentity, WorkerRole};

/// What the coordinator last learned about a worker.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorkerHealth {
    /// Not called yet.
    #[default]
    Unknown,
    /// The last call succeeded.
    Healthy,
    /// The last call failed.
    Degraded {
        /// The failure.
        last_error: InvocationError,
    },
}

impl WorkerHealth {
    /// Whether the last call succeeded.
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// One worker's entry in [`CoordinatorStatus`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerStatus {
    /// Who the worker is and how it is reached.
    pub identity: WorkerIdentity,
    /// Last known health.
    pub health: WorkerHealth,
}

/// Answer to `get_status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinatorStatus {
    /// Coordination mode in use.
    pub mode: CoordinationMode,
    /// Scout, Strategist and Executor, in that order.
    pub workers: Vec<WorkerStatus>,
}

impl CoordinatorStatus {
    /// Health of one role.
    pub fn health(&self, role: WorkerRole) -> Option<&WorkerHealth> {
        self.workers
            .iter()
            .find(|w| w.identity.role == role)
            .map(|w| &w.health)
    }
}

#[derive(Debug, Default)]
pub(crate) struct HealthTable {
    roles: Mutex<BTreeMap<WorkerRole, WorkerHealth>>,
}

impl HealthTable {
    pub(crate) fn observe<T>(&self, role: WorkerRole, result: &Result<T, InvocationError>) {
        let health = match result {
            Ok(_) => WorkerHealth::Healthy,
            Err(e) => WorkerHealth::Degraded {
                last_error: e.clone(),
            },
        };
        if let Ok(mut roles) = self.roles.lock() {
            roles.insert(role, health);
        }
    }

    pub(crate) fn get(&self, role: WorkerRole) -> WorkerHealth {
        self.roles
            .lock()
            .ok()
            .and_then(|roles| roles.get(&role).cloned())
            .unwrap_or_default()
    }
}
