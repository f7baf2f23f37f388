//! Scout: observes the board.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use trio_capability::{Capability, CapabilityContext, CapabilityError, CapabilityRegistry, RegistryError};
use trio_game::{Board, Mark, Observation, Position, quick_analysis};

/// Arguments shared by every Scout capability.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BoardArgs {
    /// 3x3 board of `""`, `"X"` and `"O"`.
    pub board: Board,
    /// Player to act. Derived from mark counts when absent.
    #[serde(default)]
    pub player: Option<Mark>,
}

impl BoardArgs {
    fn player(&self) -> Mark {
        self.player.unwrap_or_else(|| self.board.to_act())
    }
}

/// `analyze`: full observation, including fork cells and a summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct Analyze;

impl Capability for Analyze {
    const NAME: &'static str = "analyze";
    type Args = BoardArgs;
    type Output = Observation;
    type Error = CapabilityError;

    fn description(&self) -> &str {
        "Analyze the board: empty cells, winning moves, threats and forks"
    }

    async fn call(&self, args: BoardArgs, _ctx: &CapabilityContext) -> Result<Observation, CapabilityError> {
        let player = args.player();
        let mut obs = quick_analysis(&args.board, player);
        obs.forks = args.board.fork_cells(player);
        obs.summary = summarize(&obs);
        Ok(obs)
    }
}

fn summarize(obs: &Observation) -> String {
    if let Some(p) = obs.winning_moves.first() {
        return format!("{} can win at {p}", obs.player);
    }
    if let Some(p) = obs.threats.first() {
        return format!("{} must block at {p}", obs.player);
    }
    if let Some(p) = obs.forks.first() {
        return format!("{} can fork at {p}", obs.player);
    }
    format!(
        "move {}: {} empty cells, no immediate tactics",
        obs.move_number,
        obs.empty_cells.len()
    )
}

/// Output of `detect_threats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatReport {
    /// The opponent whose threats were scanned.
    pub opponent: Mark,
    /// Cells the opponent would win on, row-major.
    pub threats: Vec<Position>,
    /// Whether a block is needed right now.
    pub must_block: bool,
}

/// `detect_threats`: the opponent's immediate completion cells.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetectThreats;

impl Capability for DetectThreats {
    const NAME: &'static str = "detect_threats";
    type Args = BoardArgs;
    type Output = ThreatReport;
    type Error = CapabilityError;

    fn description(&self) -> &str {
        "Identify cells where the opponent completes three in a row next move"
    }

    async fn call(&self, args: BoardArgs, _ctx: &CapabilityContext) -> Result<ThreatReport, CapabilityError> {
        let opponent = args.player().opponent();
        let threats = args.board.completion_cells(opponent);
        Ok(ThreatReport {
            opponent,
            must_block: !threats.is_empty(),
            threats,
        })
    }
}

/// Output of `identify_opportunities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityReport {
    /// The player scanned for.
    pub player: Mark,
    /// Immediate wins.
    pub winning_moves: Vec<Position>,
    /// Cells creating two threats at once.
    pub forks: Vec<Position>,
}

/// `identify_opportunities`: the acting player's wins and forks.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentifyOpportunities;

impl Capability for IdentifyOpportunities {
    const NAME: &'static str = "identify_opportunities";
    type Args = BoardArgs;
    type Output = OpportunityReport;
    type Error = CapabilityError;

    fn description(&self) -> &str {
        "Find winning moves and fork cells for the acting player"
    }

    async fn call(
        &self,
        args: BoardArgs,
        _ctx: &CapabilityContext,
    ) -> Result<OpportunityReport, CapabilityError> {
        let player = args.player();
        Ok(OpportunityReport {
            player,
            winning_moves: args.board.completion_cells(player),
            forks: args.board.fork_cells(player),
        })
    }
}

/// Scout's capability set.
pub fn registry() -> Result<CapabilityRegistry, RegistryError> {
    CapabilityRegistry::new()
        .with(Analyze)?
        .with(DetectThreats)?
        .with(IdentifyOpportunities)
}
