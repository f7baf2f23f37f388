//! # trio-game: the board domain
//!
//! Pure tic-tac-toe logic shared by the workers and the coordinator:
//!
//! - [`Board`], [`Position`], [`Mark`] and the validation rule
//!   ([`Board::validate`])
//! - the deterministic Fallback Policy ([`fallback_move`], [`rank_moves`])
//! - the coordinator's zero-latency analysis ([`quick_analysis`])
//! - Strategist heuristics ([`strategy::best_move`])
//! - stage payloads ([`Observation`], [`Decision`], [`Action`])
//! - the rules engine boundary ([`RulesEngine`]) with an in-memory [`Game`]
//!
//! Nothing here performs I/O or reads a clock.

#![deny(missing_docs)]

pub mod board;
pub mod engine;
pub mod payload;
pub mod policy;
pub mod strategy;

pub use board::{Board, Cell, IllegalAction, Mark, Position, SIZE, WIN_LINES};
pub use engine::{Game, GameOutcome, MoveError, MoveRecord, RulesEngine};
pub use payload::{Action, Decision, Observation, quick_analysis};
pub use policy::{Priority, fallback_choice, fallback_move, rank_moves};
pub use strategy::Heuristic;
