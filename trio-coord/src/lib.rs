//! # trio-coord: the pipeline coordinator
//!
//! [`Coordinator`] turns a board and a player into one validated action by
//! driving three [`WorkerClient`](trio_protocol::WorkerClient)s:
//!
//! ```text
//! Scout.analyze(board) → observation
//!   → Strategist.decide(observation) → decision
//!     → Executor.act(decision) → action
//!       → validate(action) → apply
//! ```
//!
//! Any arrow may be replaced by a local substitute, and every replacement is
//! recorded in the turn's trace and sent to telemetry.
//!
//! ## Modes
//!
//! - **Sequential**: each stage waits for the previous one. Bounded by
//!   `analyze + decide + act`.
//! - **Parallel**: all three calls start at once on default inputs under the
//!   shared `total` deadline. The Executor's action is used only if it
//!   targets the decision's cell, and an immediate win or block found by the
//!   observation overrides a candidate that misses it.

#![deny(missing_docs)]

pub mod config;
pub mod context;
pub mod coordinator;
pub mod health;

pub use config::{CoordinatorConfig, StageDeadlines};
pub use context::{StageTimings, TraceEvent, TurnContext, TurnReport};
pub use coordinator::{Coordinator, Workers};
pub use health::{CoordinatorStatus, WorkerHealth, WorkerStatus};
