//! The Pipeline Coordinator: one validated action per turn.

use crate::config::CoordinatorConfig;
use crate::context::{TraceEvent, TurnContext, TurnReport};
use crate::health::{CoordinatorStatus, HealthTable, WorkerStatus};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use trio_game::{
    Action, Board, Decision, GameOutcome, Mark, Observation, Position, RulesEngine,
    fallback_choice, quick_analysis,
};
use trio_protocol::{
    Arguments, CoordinationMode, DurationMs, ErrorKind, InvocationError, Outcome, Stage,
    StageCapability, Substitution, TelemetryEvent, TelemetrySink, TurnError, WorkerClient,
    WorkerRole,
};

/// The three workers a coordinator drives. Fixed at wiring time.
#[derive(Clone)]
pub struct Workers {
    scout: Arc<dyn WorkerClient>,
    strategist: Arc<dyn WorkerClient>,
    executor: Arc<dyn WorkerClient>,
}

impl Workers {
    /// Wire the three roles.
    pub fn new(
        scout: Arc<dyn WorkerClient>,
        strategist: Arc<dyn WorkerClient>,
        executor: Arc<dyn WorkerClient>,
    ) -> Self {
        Self {
            scout,
            strategist,
            executor,
        }
    }

    /// The client for `role`.
    pub fn get(&self, role: WorkerRole) -> &Arc<dyn WorkerClient> {
        match role {
            WorkerRole::Scout => &self.scout,
            WorkerRole::Strategist => &self.strategist,
            WorkerRole::Executor => &self.executor,
        }
    }
}

impl std::fmt::Debug for Workers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workers")
            .field("scout", self.scout.identity())
            .field("strategist", self.strategist.identity())
            .field("executor", self.executor.identity())
            .finish()
    }
}

/// Drives Scout, Strategist and Executor through a turn.
///
/// Every worker failure is recovered by substitution:
///
/// | Stage | On failure |
/// |-------|-----------|
/// | observe | local fast analysis |
/// | decide | Fallback Policy ranking |
/// | act | the decision's move |
/// | validate | Fallback Policy move |
///
/// Only a board without an empty cell fails the turn, with
/// [`TurnError::NoLegalMove`].
pub struct Coordinator {
    workers: Workers,
    config: CoordinatorConfig,
    telemetry: Arc<dyn TelemetrySink>,
    health: HealthTable,
}

impl Coordinator {
    /// Create a coordinator.
    pub fn new(workers: Workers, config: CoordinatorConfig, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self {
            workers,
            config,
            telemetry,
            health: HealthTable::default(),
        }
    }

    /// Settings in use.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// The wired workers.
    pub fn workers(&self) -> &Workers {
        &self.workers
    }

    /// Produce a validated action for `player` on `board`. The board is not
    /// modified; see [`play_turn`](Self::play_turn) for applying the result.
    ///
    /// Telemetry gets the whole turn: one `Stage` event per trace entry as
    /// it is recorded, then a closing `Turn` (or `TurnFailed`) event.
    pub async fn process_turn(&self, board: &Board, player: Mark) -> Result<TurnReport, TurnError> {
        let span = tracing::info_span!(
            "trio.turn",
            move_number = board.move_number(),
            %player,
            mode = %self.config.mode
        );
        self.run_turn(*board, player).instrument(span).await
    }

    /// Run a turn for the engine's player to act and apply the action.
    /// A game that is already won or drawn reports `NoLegalMove`.
    pub async fn play_turn<E>(&self, engine: &mut E) -> Result<(TurnReport, GameOutcome), TurnError>
    where
        E: RulesEngine + ?Sized,
    {
        let outcome = engine.outcome();
        if outcome.is_decided() {
            return Err(TurnError::NoLegalMove(format!(
                "game already decided: {outcome:?}"
            )));
        }
        let player = engine.to_act();
        let report = self.process_turn(&engine.board(), player).await?;
        let outcome = engine
            .apply(report.action.position, player)
            .map_err(|e| TurnError::NoLegalMove(format!("rules engine refused the move: {e}")))?;
        Ok((report, outcome))
    }

    /// Mode and last known health of each worker.
    pub fn status(&self) -> CoordinatorStatus {
        CoordinatorStatus {
            mode: self.config.mode,
            workers: WorkerRole::ALL
                .iter()
                .map(|role| WorkerStatus {
                    identity: self.workers.get(*role).identity().clone(),
                    health: self.health.get(*role),
                })
                .collect(),
        }
    }

    /// Ask every worker for its capability list and update health. A
    /// worker that answers without its stage capability is degraded with
    /// `CapabilityNotFound`.
    pub async fn probe(&self, deadline: DurationMs) -> CoordinatorStatus {
        let probes = WorkerRole::ALL.map(|role| async move {
            let client = self.workers.get(role);
            let expected = stage_capability(role).as_str();
            let result =
                match tokio::time::timeout(deadline.to_std(), client.list_capabilities(deadline)).await {
                    Ok(result) => result,
                    Err(_) => Err(InvocationError::timeout(deadline)),
                }
                .and_then(|tools| {
                    if tools.iter().any(|t| t.name == expected) {
                        Ok(())
                    } else {
                        Err(InvocationError::not_found(expected))
                    }
                });
            self.health.observe(role, &result);
        });
        futures::future::join_all(probes).await;
        self.status()
    }

    async fn run_turn(&self, board: Board, player: Mark) -> Result<TurnReport, TurnError> {
        let start = Instant::now();
        let mode = self.config.mode;
        let mut ctx = TurnContext::new(board, player);
        if board.is_full() {
            return Err(self.fail(&ctx, start, "board is full"));
        }

        let candidate = match mode {
            CoordinationMode::Sequential => self.sequential(&mut ctx).await,
            CoordinationMode::Parallel => self.parallel(&mut ctx).await,
        };
        let Some(action) = self.validate(&mut ctx, candidate) else {
            return Err(self.fail(&ctx, start, "no empty cell for the fallback move"));
        };

        let duration = elapsed(start);
        let report = ctx.into_report(action, mode, duration);
        tracing::info!(
            row = report.action.position.row,
            col = report.action.position.col,
            recovered_failures = report.recovered_failures,
            %duration,
            "turn resolved"
        );
        self.telemetry.record(TelemetryEvent::Turn {
            move_number: report.move_number,
            player: player.as_str().to_string(),
            row: report.action.position.row,
            col: report.action.position.col,
            mode,
            duration,
            recovered_failures: report.recovered_failures,
        });
        Ok(report)
    }

    /// observe, then decide on the observation, then act on the decision.
    async fn sequential(&self, ctx: &mut TurnContext) -> Action {
        let deadlines = self.config.deadlines;
        let (board, player) = (ctx.board, ctx.player);

        let (result, duration) = self
            .invoke::<Observation>(StageCapability::Analyze, board_args(&board, player), deadlines.analyze)
            .await;
        let observation = self.accept_observation(ctx, result, duration);

        let (result, duration) = self
            .invoke::<Decision>(
                StageCapability::Decide,
                arguments(json!({ "observation": observation })),
                deadlines.decide,
            )
            .await;
        let decision = self.accept_decision(ctx, result, duration);

        let (result, duration) = self
            .invoke::<Action>(
                StageCapability::Act,
                arguments(json!({ "decision": decision, "board": board, "player": player })),
                deadlines.act,
            )
            .await;
        self.accept_action(ctx, result, duration, &decision, CoordinationMode::Sequential)
    }

    /// All three calls at once on default inputs, under the shared
    /// deadline, then the parallel assembly rules.
    async fn parallel(&self, ctx: &mut TurnContext) -> Action {
        let deadline = self.config.deadlines.total;
        let (board, player) = (ctx.board, ctx.player);

        let (observed, decided, acted) = futures::join!(
            self.invoke::<Observation>(StageCapability::Analyze, board_args(&board, player), deadline),
            self.invoke::<Decision>(
                StageCapability::Decide,
                arguments(json!({ "observation": Observation::bare(board, player) })),
                deadline,
            ),
            self.invoke::<Action>(StageCapability::Act, board_args(&board, player), deadline),
        );

        let observation = self.accept_observation(ctx, observed.0, observed.1);
        let decision = self.accept_decision(ctx, decided.0, decided.1);
        let action = self.accept_action(ctx, acted.0, acted.1, &decision, CoordinationMode::Parallel);
        self.safety_override(ctx, &observation, action)
    }

    /// Call one stage capability with a hard deadline and decode its result.
    /// A result that does not decode is a `HandlerError`.
    async fn invoke<T: DeserializeOwned>(
        &self,
        capability: StageCapability,
        arguments: Arguments,
        deadline: DurationMs,
    ) -> (Result<T, InvocationError>, DurationMs) {
        let role = capability.role();
        let client = self.workers.get(role);
        let span = tracing::info_span!(
            "trio.stage",
            capability = capability.as_str(),
            worker = %client.identity()
        );
        let start = Instant::now();

        let call = client.call(capability.as_str(), arguments, deadline);
        let response = match tokio::time::timeout(deadline.to_std(), call).instrument(span).await {
            Ok(response) => response,
            Err(_) => InvocationError::timeout(deadline).into(),
        };
        let result = response.into_result().and_then(|value| {
            serde_json::from_value::<T>(value).map_err(|e| {
                InvocationError::handler(format!("malformed {} result: {e}", capability.as_str()))
            })
        });
        self.health.observe(role, &result);
        (result, elapsed(start))
    }

    fn accept_observation(
        &self,
        ctx: &mut TurnContext,
        result: Result<Observation, InvocationError>,
        duration: DurationMs,
    ) -> Observation {
        let observation = match result {
            Ok(mut observation) => {
                // The turn's board is authoritative over what Scout echoed back.
                observation.board = ctx.board;
                observation.player = ctx.player;
                observation.move_number = ctx.move_number;
                let event = ctx.record_success(Stage::Observe, duration, None);
                self.report(&event);
                observation
            }
            Err(err) => {
                let event = ctx.record_failure(Stage::Observe, duration, &err, Substitution::FastAnalysis);
                self.report(&event);
                quick_analysis(&ctx.board, ctx.player)
            }
        };
        ctx.observation = Some(observation.clone());
        observation
    }

    fn accept_decision(
        &self,
        ctx: &mut TurnContext,
        result: Result<Decision, InvocationError>,
        duration: DurationMs,
    ) -> Decision {
        let decision = match result {
            Ok(decision) => {
                let event = ctx.record_success(Stage::Decide, duration, None);
                self.report(&event);
                decision
            }
            Err(err) => {
                let event =
                    ctx.record_failure(Stage::Decide, duration, &err, Substitution::FallbackRanking);
                self.report(&event);
                // A full board never gets this far; the validation gate
                // rejects the placeholder if it somehow does.
                Decision::from_ranking(&ctx.board, ctx.player)
                    .unwrap_or_else(|| Decision::new(Position::CENTER, "no empty cell", 0.0))
            }
        };
        ctx.decision = Some(decision.clone());
        decision
    }

    fn accept_action(
        &self,
        ctx: &mut TurnContext,
        result: Result<Action, InvocationError>,
        duration: DurationMs,
        decision: &Decision,
        mode: CoordinationMode,
    ) -> Action {
        let player = ctx.player;
        let decision_move = || Action::new(decision.position, player, "decision move");
        let action = match result {
            Ok(action)
                if mode == CoordinationMode::Parallel && action.position != decision.position =>
            {
                let action = decision_move();
                let event =
                    ctx.record_success(Stage::Act, duration, Some(Substitution::ExecutorDisagreed));
                self.report(&event);
                action
            }
            Ok(action) => {
                let event = ctx.record_success(Stage::Act, duration, None);
                self.report(&event);
                action
            }
            Err(err) => {
                let action = decision_move();
                let event = ctx.record_failure(Stage::Act, duration, &err, Substitution::DecisionMove);
                self.report(&event);
                action
            }
        };
        ctx.action = Some(action.clone());
        action
    }

    /// Parallel mode only: a decision made without Scout's analysis may
    /// miss an immediate win or a needed block. Prefer the observation's
    /// first legal winning cell, then its first legal threat cell.
    fn safety_override(&self, ctx: &mut TurnContext, observation: &Observation, action: Action) -> Action {
        let board = ctx.board;
        let legal = |cells: &[Position]| -> Vec<Position> {
            cells
                .iter()
                .copied()
                .filter(|p| board.validate(*p).is_ok())
                .collect()
        };
        let wins = legal(&observation.winning_moves);
        let threats = legal(&observation.threats);

        let target = if wins.is_empty() {
            threats.first().filter(|_| !threats.contains(&action.position))
        } else {
            wins.first().filter(|_| !wins.contains(&action.position))
        };

        match target.copied() {
            Some(position) => {
                let event =
                    ctx.record_success(Stage::Validate, DurationMs::ZERO, Some(Substitution::SafetyOverride));
                self.report(&event);
                let action = Action::new(position, ctx.player, "safety override");
                ctx.action = Some(action.clone());
                action
            }
            None => action,
        }
    }

    /// The validation gate: in bounds, empty, and for the acting player.
    /// Anything else is replaced by the Fallback Policy's move. `None` only
    /// when the board has no empty cell.
    fn validate(&self, ctx: &mut TurnContext, candidate: Action) -> Option<Action> {
        let start = Instant::now();
        let check = if candidate.player != ctx.player {
            Err(format!(
                "action is for {} but {} is to act",
                candidate.player, ctx.player
            ))
        } else {
            ctx.board.validate(candidate.position).map_err(|e| e.to_string())
        };

        match check {
            Ok(()) => {
                let event = ctx.record_success(Stage::Validate, elapsed(start), None);
                self.report(&event);
                Some(candidate)
            }
            Err(message) => {
                let replacement = fallback_choice(&ctx.board, ctx.player).map(|(position, priority)| {
                    Action::new(position, ctx.player, format!("fallback: {priority}"))
                });
                let err = InvocationError::new(ErrorKind::IllegalAction, message);
                let event =
                    ctx.record_failure(Stage::Validate, elapsed(start), &err, Substitution::FallbackMove);
                self.report(&event);
                replacement
            }
        }
    }

    fn report(&self, event: &TraceEvent) {
        match (&event.outcome, event.substitution) {
            (Outcome::Failure { kind }, substitution) => tracing::warn!(
                stage = %event.stage,
                %kind,
                ?substitution,
                message = event.message.as_deref().unwrap_or(""),
                "stage failed"
            ),
            (Outcome::Success, Some(substitution)) => tracing::info!(
                stage = %event.stage,
                ?substitution,
                "stage output replaced"
            ),
            (Outcome::Success, None) => tracing::debug!(
                stage = %event.stage,
                duration = %event.duration,
                "stage ok"
            ),
        }
        self.telemetry.record(TelemetryEvent::Stage {
            stage: event.stage,
            role: event.role,
            outcome: event.outcome,
            duration: event.duration,
            substitution: event.substitution,
        });
    }

    fn fail(&self, ctx: &TurnContext, start: Instant, reason: &str) -> TurnError {
        let duration = elapsed(start);
        tracing::warn!(reason, %duration, "turn failed");
        self.telemetry.record(TelemetryEvent::TurnFailed {
            move_number: ctx.move_number,
            player: ctx.player.as_str().to_string(),
            kind: ErrorKind::NoLegalMove,
            duration,
        });
        TurnError::NoLegalMove(reason.to_string())
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("workers", &self.workers)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn stage_capability(role: WorkerRole) -> StageCapability {
    match role {
        WorkerRole::Scout => StageCapability::Analyze,
        WorkerRole::Strategist => StageCapability::Decide,
        WorkerRole::Executor => StageCapability::Act,
    }
}

fn board_args(board: &Board, player: Mark) -> Arguments {
    arguments(json!({ "board": board, "player": player }))
}

fn arguments(value: Value) -> Arguments {
    match value {
        Value::Object(map) => map,
        _ => Arguments::new(),
    }
}

fn elapsed(start: Instant) -> DurationMs {
    DurationMs::from(start.elapsed())
}
