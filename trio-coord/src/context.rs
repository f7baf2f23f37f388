//! The coordinator's working record of one turn.

use serde::Serialize;
use trio_game::{Action, Board, Decision, Mark, Observation};
use trio_protocol::{
    CoordinationMode, DurationMs, ErrorKind, InvocationError, Outcome, Stage, Substitution,
    WorkerRole,
};

/// One entry of a turn's trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEvent {
    /// Pipeline step.
    pub stage: Stage,
    /// Worker behind the step, `None` for local steps.
    pub role: Option<WorkerRole>,
    /// How the worker call (or the check) ended.
    pub outcome: Outcome,
    /// Failure detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// What replaced the stage output, if anything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitution: Option<Substitution>,
    /// Time spent in the step.
    pub duration: DurationMs,
}

impl TraceEvent {
    /// Whether the step failed and was recovered.
    pub fn is_failure(&self) -> bool {
        !self.outcome.is_success()
    }
}

/// Time spent in each stage of a turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageTimings {
    /// Scout call.
    pub observe: DurationMs,
    /// Strategist call.
    pub decide: DurationMs,
    /// Executor call.
    pub act: DurationMs,
    /// Validation and fallback.
    pub validate: DurationMs,
    /// The whole turn.
    pub total: DurationMs,
}

impl StageTimings {
    fn add(&mut self, stage: Stage, duration: DurationMs) {
        let slot = match stage {
            Stage::Observe => &mut self.observe,
            Stage::Decide => &mut self.decide,
            Stage::Act => &mut self.act,
            Stage::Validate => &mut self.validate,
        };
        *slot = slot.saturating_add(duration);
    }
}

/// State of a turn in progress.
///
/// Created at the start of a turn and mutated only by the coordinator task
/// that owns it. In parallel mode the worker calls run concurrently but
/// their results are written here one at a time after they are joined.
#[derive(Debug, Clone)]
pub struct TurnContext {
    /// Board as it stood when the turn began.
    pub board: Board,
    /// 1-based move number.
    pub move_number: u32,
    /// Player to act.
    pub player: Mark,
    /// Scout's (or the fast analysis') output.
    pub observation: Option<Observation>,
    /// Strategist's (or the fallback ranking's) output.
    pub decision: Option<Decision>,
    /// Executor's (or the decision move's) output, before validation.
    pub action: Option<Action>,
    /// Every step, in the order it completed.
    pub trace: Vec<TraceEvent>,
    timings: StageTimings,
}

impl TurnContext {
    /// A fresh context for `player` acting on `board`.
    pub fn new(board: Board, player: Mark) -> Self {
        Self {
            board,
            move_number: board.move_number(),
            player,
            observation: None,
            decision: None,
            action: None,
            trace: Vec::new(),
            timings: StageTimings::default(),
        }
    }

    pub(crate) fn record_success(
        &mut self,
        stage: Stage,
        duration: DurationMs,
        substitution: Option<Substitution>,
    ) -> TraceEvent {
        self.push(TraceEvent {
            stage,
            role: stage.role(),
            outcome: Outcome::Success,
            message: None,
            substitution,
            duration,
        })
    }

    pub(crate) fn record_failure(
        &mut self,
        stage: Stage,
        duration: DurationMs,
        error: &InvocationError,
        substitution: Substitution,
    ) -> TraceEvent {
        self.push(TraceEvent {
            stage,
            role: stage.role(),
            outcome: Outcome::Failure { kind: error.kind },
            message: Some(error.message.clone()),
            substitution: Some(substitution),
            duration,
        })
    }

    fn push(&mut self, event: TraceEvent) -> TraceEvent {
        self.timings.add(event.stage, event.duration);
        self.trace.push(event.clone());
        event
    }

    /// Number of failed steps so far.
    pub fn recovered_failures(&self) -> u32 {
        self.trace.iter().filter(|e| e.is_failure()).count() as u32
    }

    pub(crate) fn into_report(
        self,
        action: Action,
        mode: CoordinationMode,
        total: DurationMs,
    ) -> TurnReport {
        let recovered_failures = self.recovered_failures();
        TurnReport {
            action,
            move_number: self.move_number,
            player: self.player,
            mode,
            observation: self.observation,
            decision: self.decision,
            recovered_failures,
            trace: self.trace,
            timings: StageTimings {
                total,
                ..self.timings
            },
        }
    }
}

/// The result of a turn: the validated action plus how it was reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnReport {
    /// The action. Always targets an empty, in-bounds cell of the board
    /// the turn started from.
    pub action: Action,
    /// Move number of the turn.
    pub move_number: u32,
    /// Player who acted.
    pub player: Mark,
    /// Mode the turn ran in.
    pub mode: CoordinationMode,
    /// Observation the decision was based on.
    pub observation: Option<Observation>,
    /// Decision the action was based on.
    pub decision: Option<Decision>,
    /// Failed steps recovered by substitution.
    pub recovered_failures: u32,
    /// Every step, in completion order.
    pub trace: Vec<TraceEvent>,
    /// Per-stage and total time.
    pub timings: StageTimings,
}

impl TurnReport {
    /// Trace entries of one stage.
    pub fn stage(&self, stage: Stage) -> impl Iterator<Item = &TraceEvent> {
        self.trace.iter().filter(move |e| e.stage == stage)
    }

    /// Whether any step of `stage` was replaced with `substitution`.
    pub fn substituted(&self, stage: Stage, substitution: Substitution) -> bool {
        self.stage(stage)
            .any(|e| e.substitution == Some(substitution))
    }

    /// Failure kind of `stage`'s worker call, if it failed.
    pub fn failure(&self, stage: Stage) -> Option<ErrorKind> {
        self.stage(stage).find_map(|e| match e.outcome {
            Outcome::Failure { kind } => Some(kind),
            Outcome::Success => None,
        })
    }
}
