//! Capability descriptors and the names of the three pipeline stages.

use crate::WorkerRole;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Introspection record for one capability, as returned by discovery.
///
/// Serializes with the wire field name `inputSchema`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    /// Unique name within its worker.
    pub name: String,
    /// What the capability does.
    pub description: String,
    /// JSON Schema of the accepted arguments.
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

impl CapabilityDescriptor {
    /// Create a new descriptor.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// The capability each pipeline stage invokes on its worker.
///
/// The coordinator dispatches by this enum; the string form exists only at
/// the transport boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageCapability {
    /// Scout: observe the board.
    Analyze,
    /// Strategist: choose a move from an observation.
    Decide,
    /// Executor: turn a decision into a concrete action.
    Act,
}

impl StageCapability {
    /// All stages in pipeline order.
    pub const ALL: [StageCapability; 3] = [Self::Analyze, Self::Decide, Self::Act];

    /// The capability name on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analyze => "analyze",
            Self::Decide => "decide",
            Self::Act => "act",
        }
    }

    /// The worker role that owns this capability.
    pub fn role(&self) -> WorkerRole {
        match self {
            Self::Analyze => WorkerRole::Scout,
            Self::Decide => WorkerRole::Strategist,
            Self::Act => WorkerRole::Executor,
        }
    }
}

impl fmt::Display for StageCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
