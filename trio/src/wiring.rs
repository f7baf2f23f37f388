//! Building a [`Coordinator`] from a [`SystemConfig`].

use crate::config::{ConfigError, SystemConfig, WorkerConfig};
use std::sync::Arc;
use trio_coord::{Coordinator, Workers};
use trio_protocol::{TelemetrySink, TransportKind, WorkerClient, WorkerRole};
use trio_transport::{LocalClient, RemoteClient};
use trio_worker::endpoint_for;

/// A client for `role` as `config` describes it. Local workers get a fresh
/// endpoint reporting to `telemetry`.
pub fn client_for(
    role: WorkerRole,
    config: &WorkerConfig,
    telemetry: Arc<dyn TelemetrySink>,
) -> Result<Arc<dyn WorkerClient>, ConfigError> {
    match config.transport {
        TransportKind::Local => {
            let endpoint = endpoint_for(role, telemetry)?;
            Ok(Arc::new(LocalClient::new(Arc::new(endpoint))))
        }
        TransportKind::Remote => {
            let url = config.url.clone().ok_or_else(|| {
                ConfigError::Invalid(format!("workers.{role}: remote transport requires a url"))
            })?;
            Ok(Arc::new(RemoteClient::new(role, url)))
        }
    }
}

/// Validate `config` and wire a coordinator to the workers it names.
pub fn build_coordinator(
    config: &SystemConfig,
    telemetry: Arc<dyn TelemetrySink>,
) -> Result<Coordinator, ConfigError> {
    config.validate()?;
    let client = |role| client_for(role, config.workers.get(role), telemetry.clone());
    let workers = Workers::new(
        client(WorkerRole::Scout)?,
        client(WorkerRole::Strategist)?,
        client(WorkerRole::Executor)?,
    );
    tracing::info!(workers = ?workers, mode = %config.coordinator.mode, "coordinator wired");
    Ok(Coordinator::new(workers, config.coordinator, telemetry))
}
