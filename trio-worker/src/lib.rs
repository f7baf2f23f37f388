//! # trio-worker: worker endpoints
//!
//! A [`WorkerEndpoint`] wraps one role's [`CapabilityRegistry`] and answers
//! `list_capabilities`, `invoke` and `describe`. It is the same object
//! whether it is called in-process or served over HTTP; transports live in
//! `trio-transport`.
//!
//! | Role | Capabilities |
//! |------|-------------|
//! | Scout | `analyze`, `detect_threats`, `identify_opportunities` |
//! | Strategist | `decide` |
//! | Executor | `act` |

#![deny(missing_docs)]

pub mod endpoint;
pub mod executor;
pub mod scout;
pub mod strategist;

pub use endpoint::{EndpointStats, WorkerEndpoint};

use std::sync::Arc;
use trio_capability::{CapabilityRegistry, RegistryError};
use trio_protocol::{TelemetrySink, WorkerRole};

/// The capability set of a role.
pub fn registry_for(role: WorkerRole) -> Result<CapabilityRegistry, RegistryError> {
    match role {
        WorkerRole::Scout => scout::registry(),
        WorkerRole::Strategist => strategist::registry(),
        WorkerRole::Executor => executor::registry(),
    }
}

/// An endpoint serving `role`'s capability set, reporting to `telemetry`.
pub fn endpoint_for(
    role: WorkerRole,
    telemetry: Arc<dyn TelemetrySink>,
) -> Result<WorkerEndpoint, RegistryError> {
    Ok(WorkerEndpoint::new(role, registry_for(role)?).with_telemetry(telemetry))
}
