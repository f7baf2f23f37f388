//! Coordinator settings.

use serde::{Deserialize, Serialize};
use trio_protocol::{CoordinationMode, DurationMs};

/// How long the coordinator waits on each stage.
///
/// Sequential turns are bounded by `analyze + decide + act`, parallel
/// turns by `total`, plus the local work of validation and fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageDeadlines {
    /// Scout's `analyze`.
    pub analyze: DurationMs,
    /// Strategist's `decide`.
    pub decide: DurationMs,
    /// Executor's `act`.
    pub act: DurationMs,
    /// Shared deadline of a parallel turn.
    pub total: DurationMs,
}

impl StageDeadlines {
    /// The same deadline for every sequential stage.
    pub fn uniform(stage: DurationMs, total: DurationMs) -> Self {
        Self {
            analyze: stage,
            decide: stage,
            act: stage,
            total,
        }
    }

    /// Upper bound on the worker wait of a sequential turn.
    pub fn sequential_bound(&self) -> DurationMs {
        self.analyze.saturating_add(self.decide).saturating_add(self.act)
    }

    /// Upper bound on the worker wait of a turn in `mode`.
    pub fn bound(&self, mode: CoordinationMode) -> DurationMs {
        match mode {
            CoordinationMode::Sequential => self.sequential_bound(),
            CoordinationMode::Parallel => self.total,
        }
    }
}

impl Default for StageDeadlines {
    /// 8 s per stage, 15 s for a parallel turn.
    fn default() -> Self {
        Self::uniform(DurationMs::from_secs(8), DurationMs::from_secs(15))
    }
}

/// Everything a [`Coordinator`](crate::Coordinator) needs besides its
/// workers and telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Sequential or parallel.
    pub mode: CoordinationMode,
    /// Per-stage deadlines.
    pub deadlines: StageDeadlines,
}

impl CoordinatorConfig {
    /// Default deadlines with the given mode.
    pub fn with_mode(mode: CoordinationMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = CoordinatorConfig::default();
        assert_eq!(c.mode, CoordinationMode::Sequential);
        assert_eq!(c.deadlines.analyze, DurationMs::from_secs(8));
        assert_eq!(c.deadlines.total, DurationMs::from_secs(15));
        assert_eq!(c.deadlines.sequential_bound(), DurationMs::from_secs(24));
        assert_eq!(
            c.deadlines.bound(CoordinationMode::Parallel),
            DurationMs::from_secs(15)
        );
    }
}
