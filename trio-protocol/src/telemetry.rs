//! The Telemetry interface: what the endpoints and the coordinator report.

use crate::{CoordinationMode, DurationMs, ErrorKind, StageCapability, WorkerRole};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A step of the turn pipeline, as recorded in traces and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Scout's analysis.
    Observe,
    /// Strategist's decision.
    Decide,
    /// Executor's action.
    Act,
    /// The validation gate in front of the rules engine.
    Validate,
}

impl Stage {
    /// The capability a worker-backed stage invokes. `None` for `Validate`.
    pub fn capability(&self) -> Option<StageCapability> {
        match self {
            Self::Observe => Some(StageCapability::Analyze),
            Self::Decide => Some(StageCapability::Decide),
            Self::Act => Some(StageCapability::Act),
            Self::Validate => None,
        }
    }

    /// The worker role behind a worker-backed stage.
    pub fn role(&self) -> Option<WorkerRole> {
        self.capability().map(|c| c.role())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Observe => "observe",
            Self::Decide => "decide",
            Self::Act => "act",
            Self::Validate => "validate",
        })
    }
}

/// How a call or a stage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// It worked.
    Success,
    /// It failed with the given kind.
    Failure {
        /// What went wrong.
        kind: ErrorKind,
    },
}

impl Outcome {
    /// Whether this is `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// What the coordinator put in place of a stage output it could not use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Substitution {
    /// Locally computed board analysis in place of Scout's.
    FastAnalysis,
    /// Fallback Policy ranking in place of Strategist's decision.
    FallbackRanking,
    /// The decision's proposed move in place of Executor's action.
    DecisionMove,
    /// Fallback Policy move in place of an illegal action.
    FallbackMove,
    /// Parallel mode: Executor acted on a different cell than the decision.
    ExecutorDisagreed,
    /// Parallel mode: the observation showed a win or block the candidate missed.
    SafetyOverride,
}

/// One telemetry record.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// An endpoint ran (or failed to run) a capability.
    Invocation {
        /// Role of the endpoint.
        role: WorkerRole,
        /// Requested capability name.
        capability: String,
        /// Time spent inside the endpoint.
        duration: DurationMs,
        /// How it ended.
        outcome: Outcome,
    },
    /// The coordinator finished one stage of a turn.
    Stage {
        /// Which stage.
        stage: Stage,
        /// Worker behind the stage, if any.
        role: Option<WorkerRole>,
        /// How the worker call (or the validation) ended.
        outcome: Outcome,
        /// Wall-clock time of the stage.
        duration: DurationMs,
        /// Replacement applied, if any.
        substitution: Option<Substitution>,
    },
    /// A turn resolved to an action.
    ///
    /// This is the last record of a turn. The `Stage` events emitted just
    /// before it, in order, are the turn's full trace, so the pair makes up
    /// the turn's record.
    Turn {
        /// Move number of the turn.
        move_number: u32,
        /// Acting player's mark.
        player: String,
        /// Chosen row.
        row: i32,
        /// Chosen column.
        col: i32,
        /// Coordination mode used.
        mode: CoordinationMode,
        /// Wall-clock time of the whole turn.
        duration: DurationMs,
        /// Number of stage failures recovered by substitution.
        recovered_failures: u32,
    },
    /// A turn ended without an action.
    TurnFailed {
        /// Move number of the turn.
        move_number: u32,
        /// Acting player's mark.
        player: String,
        /// Why.
        kind: ErrorKind,
        /// Wall-clock time of the whole turn.
        duration: DurationMs,
    },
}

/// Destination for telemetry events.
///
/// Sinks are append-only and must tolerate concurrent writers: parallel
/// mode and concurrent endpoints record at the same time. `record` should
/// return quickly; it is called on the hot path of every invocation.
pub trait TelemetrySink: Send + Sync {
    /// Append one event.
    fn record(&self, event: TelemetryEvent);
}

/// A sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn record(&self, _event: TelemetryEvent) {}
}
