//! Strategist heuristics. Richer than the fallback ranking: forks and
//! opposite corners are considered before plain corners.

use crate::board::{Board, Mark, Position};
use crate::payload::Decision;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The rule that produced a strategic move, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// Complete three in a row.
    Win,
    /// Stop the opponent completing three in a row.
    Block,
    /// Create two threats at once.
    Fork,
    /// Take the center.
    Center,
    /// Take the corner opposite one the opponent holds.
    OppositeCorner,
    /// Take any corner.
    Corner,
    /// Take an edge midpoint.
    Side,
}

impl Heuristic {
    /// Confidence attached to decisions made by this rule.
    pub fn confidence(self) -> f64 {
        match self {
            Self::Win => 1.0,
            Self::Block => 0.95,
            Self::Fork => 0.9,
            Self::Center => 0.8,
            Self::OppositeCorner => 0.75,
            Self::Corner => 0.7,
            Self::Side => 0.5,
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Win => "win",
            Self::Block => "block",
            Self::Fork => "fork",
            Self::Center => "center",
            Self::OppositeCorner => "opposite corner",
            Self::Corner => "corner",
            Self::Side => "side",
        })
    }
}

/// The strongest heuristic move for `mark`, row-major within a rule.
/// `None` on a full board.
pub fn best_move(board: &Board, mark: Mark) -> Option<(Position, Heuristic)> {
    let empty = |p: &Position| board.get(*p).is_some_and(|c| c.is_empty());
    let first = |cells: Vec<Position>| cells.into_iter().next();
    let opponent = mark.opponent().cell();

    if let Some(p) = first(board.completion_cells(mark)) {
        return Some((p, Heuristic::Win));
    }
    if let Some(p) = first(board.completion_cells(mark.opponent())) {
        return Some((p, Heuristic::Block));
    }
    if let Some(p) = first(board.fork_cells(mark)) {
        return Some((p, Heuristic::Fork));
    }
    if empty(&Position::CENTER) {
        return Some((Position::CENTER, Heuristic::Center));
    }
    let opposite = Position::CORNERS
        .iter()
        .filter(|c| board.get(**c) == Some(opponent))
        .filter_map(|c| c.opposite_corner())
        .filter(empty)
        .min();
    if let Some(p) = opposite {
        return Some((p, Heuristic::OppositeCorner));
    }
    if let Some(p) = Position::CORNERS.into_iter().find(empty) {
        return Some((p, Heuristic::Corner));
    }
    Position::SIDES
        .into_iter()
        .find(empty)
        .map(|p| (p, Heuristic::Side))
}

/// [`best_move`] as a [`Decision`].
pub fn decide(board: &Board, mark: Mark) -> Option<Decision> {
    best_move(board, mark).map(|(pos, rule)| {
        Decision::new(pos, format!("{rule} at {pos}"), rule.confidence())
    })
}
