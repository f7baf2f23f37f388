//! The Fallback Policy: a pure, deterministic move choice from the board
//! alone. Always available, never random.

use crate::board::{Board, Mark, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the fallback policy picked a cell. Ordered from strongest to weakest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Completes three in a row for the acting player.
    Win,
    /// Stops the opponent completing three in a row.
    Block,
    /// The center cell.
    Center,
    /// An empty corner.
    Corner,
    /// Any other empty cell.
    Any,
}

impl Priority {
    /// One-line rationale used in decisions built from the ranking.
    pub fn rationale(self) -> &'static str {
        match self {
            Self::Win => "complete three in a row",
            Self::Block => "block the opponent's three in a row",
            Self::Center => "take the center",
            Self::Corner => "take a corner",
            Self::Any => "take the first empty cell",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Win => "win",
            Self::Block => "block",
            Self::Center => "center",
            Self::Corner => "corner",
            Self::Any => "any",
        })
    }
}

/// Every empty cell, ranked by the fallback priorities and, within a
/// priority, in row-major order. Each cell appears once, at its strongest
/// priority. Empty when the board is full.
pub fn rank_moves(board: &Board, mark: Mark) -> Vec<(Position, Priority)> {
    let empty = board.empty_cells();
    let wins = board.completion_cells(mark);
    let blocks = board.completion_cells(mark.opponent());

    let mut ranked: Vec<(Position, Priority)> = empty
        .into_iter()
        .map(|pos| {
            let priority = if wins.contains(&pos) {
                Priority::Win
            } else if blocks.contains(&pos) {
                Priority::Block
            } else if pos == Position::CENTER {
                Priority::Center
            } else if Position::CORNERS.contains(&pos) {
                Priority::Corner
            } else {
                Priority::Any
            };
            (pos, priority)
        })
        .collect();
    // Stable sort keeps row-major order within each priority.
    ranked.sort_by_key(|(_, priority)| *priority);
    ranked
}

/// The Fallback Policy: the first cell of [`rank_moves`].
///
/// Returns `None` only when the board has no empty cell.
///
/// ```
/// use trio_game::{fallback_move, Board, Mark, Position};
///
/// assert_eq!(fallback_move(&Board::new(), Mark::X), Some(Position::CENTER));
/// let b = Board::from_rows(["XX.", ".O.", "..."]);
/// assert_eq!(fallback_move(&b, Mark::O), Some(Position::new(0, 2)));
/// ```
pub fn fallback_move(board: &Board, mark: Mark) -> Option<Position> {
    fallback_choice(board, mark).map(|(pos, _)| pos)
}

/// Like [`fallback_move`], with the priority that selected the cell.
pub fn fallback_choice(board: &Board, mark: Mark) -> Option<(Position, Priority)> {
    rank_moves(board, mark).into_iter().next()
}
