//! Executor: turns a decision into a concrete action.

use schemars::JsonSchema;
use serde::Deserialize;
use trio_capability::{Capability, CapabilityContext, CapabilityError, CapabilityRegistry, RegistryError};
use trio_game::{Action, Board, Decision, Mark, Position};

/// Arguments of `act`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ActArgs {
    /// Strategist's decision. Absent when invoked speculatively.
    #[serde(default)]
    pub decision: Option<Decision>,
    /// Board the action applies to.
    pub board: Board,
    /// Player to act. Derived from mark counts when absent.
    #[serde(default)]
    pub player: Option<Mark>,
}

/// `act`: execute the proposed move if it is legal, otherwise the center,
/// otherwise the first empty cell.
#[derive(Debug, Default, Clone, Copy)]
pub struct Act;

impl Capability for Act {
    const NAME: &'static str = "act";
    type Args = ActArgs;
    type Output = Action;
    type Error = CapabilityError;

    fn description(&self) -> &str {
        "Validate and execute the decided move"
    }

    async fn call(&self, args: ActArgs, _ctx: &CapabilityContext) -> Result<Action, CapabilityError> {
        let player = args.player.unwrap_or_else(|| args.board.to_act());
        let proposed = args
            .decision
            .as_ref()
            .map(|d| d.position)
            .filter(|p| args.board.validate(*p).is_ok());
        if let Some(pos) = proposed {
            return Ok(Action::new(pos, player, "executed decision"));
        }
        if args.board.validate(Position::CENTER).is_ok() {
            return Ok(Action::new(Position::CENTER, player, "center"));
        }
        args.board
            .empty_cells()
            .first()
            .map(|pos| Action::new(*pos, player, "first empty cell"))
            .ok_or_else(|| CapabilityError::Handler("no empty cell to act on".into()))
    }
}

/// Executor's capability set.
pub fn registry() -> Result<CapabilityRegistry, RegistryError> {
    CapabilityRegistry::new().with(Act)
}
