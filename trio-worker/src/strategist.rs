//! Strategist: chooses a move from an observation.

use schemars::JsonSchema;
use serde::Deserialize;
use trio_capability::{Capability, CapabilityContext, CapabilityError, CapabilityRegistry, RegistryError};
use trio_game::{Decision, Observation, strategy};

/// Arguments of `decide`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DecideArgs {
    /// Scout's observation, or a bare one carrying only board and player.
    pub observation: Observation,
}

/// `decide`: pick a move by the strategy heuristics.
///
/// The observation's board is authoritative; its precomputed lists are
/// advisory and may be empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct Decide;

impl Capability for Decide {
    const NAME: &'static str = "decide";
    type Args = DecideArgs;
    type Output = Decision;
    type Error = CapabilityError;

    fn description(&self) -> &str {
        "Choose the best move: win, block, fork, center, opposite corner, corner, side"
    }

    async fn call(&self, args: DecideArgs, _ctx: &CapabilityContext) -> Result<Decision, CapabilityError> {
        let obs = args.observation;
        strategy::decide(&obs.board, obs.player)
            .ok_or_else(|| CapabilityError::Handler("no empty cell to decide on".into()))
    }
}

/// Strategist's capability set.
pub fn registry() -> Result<CapabilityRegistry, RegistryError> {
    CapabilityRegistry::new().with(Decide)
}
