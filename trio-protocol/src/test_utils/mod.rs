//! Scripted worker clients for testing.
//!
//! Available behind the `test-utils` feature flag. Each client answers
//! from a script instead of a real endpoint, so coordinator behavior can be
//! tested against every failure shape without a transport.

mod failing;
mod fixed;
mod stalling;

pub use failing::{FailingClient, UnreachableClient};
pub use fixed::FixedClient;
pub use stalling::StallingClient;

use crate::{TransportKind, WorkerIdentity, WorkerRole};

fn scripted_identity(role: WorkerRole, label: &str) -> WorkerIdentity {
    WorkerIdentity::new(role, TransportKind::Local, format!("scripted:{label}"))
}
