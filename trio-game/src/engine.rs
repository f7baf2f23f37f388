//! The rules engine boundary and a trivial in-memory implementation.

use crate::board::{Board, IllegalAction, Mark, Position};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// State of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GameOutcome {
    /// Moves remain and nobody has won.
    InProgress,
    /// A player completed a line.
    Won {
        /// The winner.
        winner: Mark,
    },
    /// The board filled up without a winner.
    Draw,
}

impl GameOutcome {
    /// Whether the game has ended.
    pub fn is_decided(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Why a move was refused by the rules engine.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    /// The game is already won or drawn.
    #[error("game already decided: {0:?}")]
    GameOver(GameOutcome),
    /// It is the other player's turn.
    #[error("not {0}'s turn")]
    OutOfTurn(Mark),
    /// The target cell failed validation.
    #[error(transparent)]
    Illegal(#[from] IllegalAction),
}

/// The board-state machine the coordinator applies validated actions to.
pub trait RulesEngine: Send {
    /// Current board.
    fn board(&self) -> Board;
    /// Player whose turn it is.
    fn to_act(&self) -> Mark;
    /// Current outcome.
    fn outcome(&self) -> GameOutcome;
    /// Apply a move for `player`.
    fn apply(&mut self, pos: Position, player: Mark) -> Result<GameOutcome, MoveError>;
}

/// One recorded move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// 1-based move number.
    pub move_number: u32,
    /// Who moved.
    pub player: Mark,
    /// Where.
    pub position: Position,
}

/// In-memory tic-tac-toe. X moves first.
#[derive(Debug, Clone, Default)]
pub struct Game {
    board: Board,
    history: Vec<MoveRecord>,
}

impl Game {
    /// A fresh game.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a board. The player to act is derived from mark counts.
    pub fn from_board(board: Board) -> Self {
        Self {
            board,
            history: Vec::new(),
        }
    }

    /// Moves played through this engine, oldest first.
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }
}

impl RulesEngine for Game {
    fn board(&self) -> Board {
        self.board
    }

    fn to_act(&self) -> Mark {
        self.board.to_act()
    }

    fn outcome(&self) -> GameOutcome {
        match self.board.winner() {
            Some(winner) => GameOutcome::Won { winner },
            None if self.board.is_full() => GameOutcome::Draw,
            None => GameOutcome::InProgress,
        }
    }

    fn apply(&mut self, pos: Position, player: Mark) -> Result<GameOutcome, MoveError> {
        let outcome = self.outcome();
        if outcome.is_decided() {
            return Err(MoveError::GameOver(outcome));
        }
        if player != self.to_act() {
            return Err(MoveError::OutOfTurn(player));
        }
        let move_number = self.board.move_number();
        self.board.place(pos, player)?;
        self.history.push(MoveRecord {
            move_number,
            player,
            position: pos,
        });
        Ok(self.outcome())
    }
}
