//! # trio-telemetry: where telemetry goes
//!
//! Implementations of [`trio_protocol::TelemetrySink`]:
//!
//! - [`TracingSink`] emits structured `tracing` events
//! - [`MemorySink`] keeps an ordered, sequence-numbered log for inspection
//! - [`FanoutSink`] forwards to several sinks in order
//!
//! `NullSink` lives in `trio-protocol`.

#![deny(missing_docs)]

pub mod fanout;
pub mod memory;
pub mod tracing_sink;

pub use fanout::FanoutSink;
pub use memory::{MemorySink, Recorded};
pub use tracing_sink::TracingSink;
