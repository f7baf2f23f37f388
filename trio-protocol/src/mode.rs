//! Coordination mode.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the coordinator runs the three stages of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinationMode {
    /// One stage after another, each fed by the previous one.
    #[default]
    Sequential,
    /// All three stages at once on default inputs, under one shared deadline.
    Parallel,
}

impl fmt::Display for CoordinationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
        })
    }
}
