//! Stage payloads: what Scout observes, what Strategist decides and what
//! Executor does. These are the typed results of `analyze`, `decide` and
//! `act`, and the typed arguments the next stage receives.

use crate::board::{Board, Mark, Position};
use crate::policy::{Priority, rank_moves};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Scout's view of the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Observation {
    /// Board as analysed.
    pub board: Board,
    /// Player to act.
    pub player: Mark,
    /// 1-based move number.
    pub move_number: u32,
    /// Empty cells, row-major.
    #[serde(default)]
    pub empty_cells: Vec<Position>,
    /// Cells that win immediately for `player`.
    #[serde(default)]
    pub winning_moves: Vec<Position>,
    /// Cells the opponent would win on next move.
    #[serde(default)]
    pub threats: Vec<Position>,
    /// Cells where `player` would create two threats at once.
    #[serde(default)]
    pub forks: Vec<Position>,
    /// Short human-readable summary.
    #[serde(default)]
    pub summary: String,
}

impl Observation {
    /// An observation carrying only the board, player and move number.
    /// Used as the default upstream context in parallel mode.
    pub fn bare(board: Board, player: Mark) -> Self {
        Self {
            board,
            player,
            move_number: board.move_number(),
            empty_cells: Vec::new(),
            winning_moves: Vec::new(),
            threats: Vec::new(),
            forks: Vec::new(),
            summary: String::new(),
        }
    }
}

/// The cheap local analysis the coordinator substitutes when Scout fails:
/// empty cells plus immediate two-in-a-row detection for both players.
/// Never fails and performs no I/O.
pub fn quick_analysis(board: &Board, player: Mark) -> Observation {
    let empty_cells = board.empty_cells();
    let winning_moves = board.completion_cells(player);
    let threats = board.completion_cells(player.opponent());
    let summary = format!(
        "{} empty, {} winning, {} threatened",
        empty_cells.len(),
        winning_moves.len(),
        threats.len()
    );
    Observation {
        board: *board,
        player,
        move_number: board.move_number(),
        empty_cells,
        winning_moves,
        threats,
        forks: Vec::new(),
        summary,
    }
}

/// Strategist's choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Decision {
    /// Proposed move.
    pub position: Position,
    /// Why this move.
    pub rationale: String,
    /// 0.0 to 1.0.
    pub confidence: f64,
}

impl Decision {
    /// Create a decision.
    pub fn new(position: Position, rationale: impl Into<String>, confidence: f64) -> Self {
        Self {
            position,
            rationale: rationale.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// The decision the Fallback Policy's ranking makes for `player`.
    /// `None` on a full board.
    pub fn from_ranking(board: &Board, player: Mark) -> Option<Self> {
        rank_moves(board, player).first().map(|(pos, priority)| {
            let confidence = match priority {
                Priority::Win => 1.0,
                Priority::Block => 0.95,
                Priority::Center => 0.7,
                Priority::Corner => 0.6,
                Priority::Any => 0.4,
            };
            Self::new(*pos, format!("fallback: {}", priority.rationale()), confidence)
        })
    }
}

/// Executor's concrete action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Action {
    /// Target cell.
    pub position: Position,
    /// Who plays it.
    pub player: Mark,
    /// How the executor arrived at it.
    #[serde(default)]
    pub note: String,
}

impl Action {
    /// Create an action.
    pub fn new(position: Position, player: Mark, note: impl Into<String>) -> Self {
        Self {
            position,
            player,
            note: note.into(),
        }
    }
}
