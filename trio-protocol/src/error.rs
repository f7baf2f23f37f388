//! The failure taxonomy shared by endpoints, transports and the coordinator.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Every way a capability call or a turn can fail.
///
/// Per-stage kinds are recovered inside the coordinator by substitution.
/// Only [`ErrorKind::NoLegalMove`] reaches the caller of a turn.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The worker has no capability with the requested name.
    CapabilityNotFound,
    /// The arguments did not match the capability's input contract.
    InvalidArguments,
    /// The handler ran and failed (or panicked).
    HandlerError,
    /// The network or connection failed, or the peer spoke nonsense.
    TransportError,
    /// No answer arrived before the deadline.
    Timeout,
    /// The proposed action failed validation against the board.
    IllegalAction,
    /// The board has no empty cell left.
    NoLegalMove,
}

impl ErrorKind {
    /// Stable snake_case name, as used on the wire and in telemetry.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CapabilityNotFound => "capability_not_found",
            Self::InvalidArguments => "invalid_arguments",
            Self::HandlerError => "handler_error",
            Self::TransportError => "transport_error",
            Self::Timeout => "timeout",
            Self::IllegalAction => "illegal_action",
            Self::NoLegalMove => "no_legal_move",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed invocation: the kind plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct InvocationError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Detail for logs and traces.
    pub message: String,
}

impl InvocationError {
    /// Create an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// `CapabilityNotFound` for the given name.
    pub fn not_found(name: &str) -> Self {
        Self::new(
            ErrorKind::CapabilityNotFound,
            format!("capability not found: {name}"),
        )
    }

    /// `Timeout` after the given deadline.
    pub fn timeout(deadline: crate::DurationMs) -> Self {
        Self::new(ErrorKind::Timeout, format!("no response within {deadline}"))
    }

    /// `TransportError` with the given detail.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransportError, message)
    }

    /// `HandlerError` with the given detail.
    pub fn handler(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::HandlerError, message)
    }
}

/// Turn-level errors. Everything else is recovered before it gets here.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    /// The board is full (or the game is already decided) and no legal
    /// cell exists for the acting player.
    #[error("no legal move: {0}")]
    NoLegalMove(String),
}

impl TurnError {
    /// The taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoLegalMove(_) => ErrorKind::NoLegalMove,
        }
    }
}
