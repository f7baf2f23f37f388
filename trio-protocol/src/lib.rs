//! # trio-protocol: turn coordination protocol types
//!
//! This crate defines the boundary every other `trio` crate speaks: how a
//! coordinator invokes a named capability on a worker, what comes back, and
//! how those exchanges are observed.
//!
//! ## The Pieces
//!
//! | Piece | Types | What it does |
//! |-------|-------|-------------|
//! | Invocation | [`InvocationRequest`], [`InvocationResponse`] | One call, one answer |
//! | Errors | [`ErrorKind`], [`InvocationError`], [`TurnError`] | The failure taxonomy |
//! | Workers | [`WorkerClient`], [`WorkerIdentity`], [`WorkerRole`] | Transport-agnostic calls |
//! | Capabilities | [`CapabilityDescriptor`], [`StageCapability`] | Discovery and stage names |
//! | Telemetry | [`TelemetrySink`], [`TelemetryEvent`] | Observation of calls and turns |
//!
//! ## Design Principle
//!
//! [`WorkerClient::call`] means "invoke this capability and give me an
//! answer within the deadline", not "make an HTTP request" or "call a
//! function". The in-process adapter and the JSON-RPC adapter implement the
//! same trait and produce the same success/failure shapes, so the
//! coordinator never learns which one it holds.
//!
//! Nothing in this crate performs I/O.

#![deny(missing_docs)]

pub mod capability;
pub mod duration;
pub mod error;
pub mod id;
pub mod invocation;
pub mod mode;
pub mod telemetry;
pub mod worker;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use capability::{CapabilityDescriptor, StageCapability};
pub use duration::DurationMs;
pub use error::{ErrorKind, InvocationError, TurnError};
pub use id::{RequestId, RequestIdGen};
pub use invocation::{Arguments, InvocationRequest, InvocationResponse};
pub use mode::CoordinationMode;
pub use telemetry::{
    NullSink, Outcome, Stage, Substitution, TelemetryEvent, TelemetrySink,
};
pub use worker::{BoxFuture, TransportKind, WorkerClient, WorkerIdentity, WorkerRole};
