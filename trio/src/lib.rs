#![deny(missing_docs)]
//! # trio: umbrella crate
//!
//! One import surface for the trio workspace. Re-exports the protocol and
//! its implementations behind feature flags, plus a `prelude` for the happy
//! path and (feature `config`) TOML configuration that wires a
//! [`Coordinator`](trio_coord::Coordinator) to local or remote workers.

#[cfg(feature = "worker")]
pub use trio_capability;
#[cfg(feature = "coord")]
pub use trio_coord;
#[cfg(feature = "core")]
pub use trio_game;
#[cfg(feature = "core")]
pub use trio_protocol;
#[cfg(feature = "telemetry")]
pub use trio_telemetry;
#[cfg(feature = "transport")]
pub use trio_transport;
#[cfg(feature = "worker")]
pub use trio_worker;

#[cfg(feature = "config")]
pub mod config;
#[cfg(feature = "config")]
pub mod wiring;

#[cfg(feature = "config")]
pub use config::{ConfigError, SystemConfig, WorkerConfig, WorkersConfig};
#[cfg(feature = "config")]
pub use wiring::{build_coordinator, client_for};

/// Happy-path imports for wiring and running a trio.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use trio_protocol::{
        CoordinationMode, DurationMs, ErrorKind, InvocationError, InvocationResponse, Stage,
        Substitution, TelemetryEvent, TelemetrySink, TransportKind, TurnError, WorkerClient,
        WorkerRole,
    };

    #[cfg(feature = "core")]
    pub use trio_game::{Board, Game, GameOutcome, Mark, Position, RulesEngine};

    #[cfg(feature = "worker")]
    pub use trio_capability::{Capability, CapabilityRegistry};

    #[cfg(feature = "worker")]
    pub use trio_worker::{WorkerEndpoint, endpoint_for};

    #[cfg(feature = "telemetry")]
    pub use trio_telemetry::{FanoutSink, MemorySink, TracingSink};

    #[cfg(feature = "coord")]
    pub use trio_coord::{Coordinator, CoordinatorConfig, StageDeadlines, TurnReport, Workers};

    #[cfg(feature = "transport")]
    pub use trio_transport::{LocalClient, RemoteClient, WorkerServer};

    #[cfg(feature = "config")]
    pub use crate::config::{ConfigError, SystemConfig};

    #[cfg(feature = "config")]
    pub use crate::wiring::build_coordinator;
}
