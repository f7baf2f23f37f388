//! TracingSink: telemetry as structured `tracing` events.
//!
//! | Event | Level | Target |
//! |-------|-------|--------|
//! | Invocation, success | `DEBUG` | `trio.invocation` |
//! | Invocation, failure | `DEBUG` | `trio.invocation` |
//! | Stage, success | `DEBUG` | `trio.stage` |
//! | Stage, failure or substitution | `WARN` | `trio.stage` |
//! | Turn | `INFO` | `trio.turn` |
//! | TurnFailed | `WARN` | `trio.turn` |
//!
//! Install a subscriber in the binary to see them; this sink never does.

use trio_protocol::{Outcome, TelemetryEvent, TelemetrySink};

/// Forwards each event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TracingSink {
    /// Create a tracing sink.
    pub fn new() -> Self {
        Self
    }
}

impl TelemetrySink for TracingSink {
    fn record(&self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::Invocation {
                role,
                capability,
                duration,
                outcome,
            } => match outcome {
                Outcome::Success => tracing::debug!(
                    target: "trio.invocation",
                    %role, %capability, duration_ms = duration.as_millis(),
                    "invocation ok"
                ),
                Outcome::Failure { kind } => tracing::debug!(
                    target: "trio.invocation",
                    %role, %capability, duration_ms = duration.as_millis(), %kind,
                    "invocation failed"
                ),
            },
            TelemetryEvent::Stage {
                stage,
                role,
                outcome,
                duration,
                substitution,
            } => {
                let role = role.map(|r| r.as_str()).unwrap_or("coordinator");
                match (outcome, substitution) {
                    (Outcome::Success, None) => tracing::debug!(
                        target: "trio.stage",
                        %stage, role, duration_ms = duration.as_millis(),
                        "stage ok"
                    ),
                    (Outcome::Success, Some(sub)) => tracing::warn!(
                        target: "trio.stage",
                        %stage, role, duration_ms = duration.as_millis(), substitution = ?sub,
                        "stage output replaced"
                    ),
                    (Outcome::Failure { kind }, sub) => tracing::warn!(
                        target: "trio.stage",
                        %stage, role, duration_ms = duration.as_millis(), %kind, substitution = ?sub,
                        "stage failed"
                    ),
                }
            }
            TelemetryEvent::Turn {
                move_number,
                player,
                row,
                col,
                mode,
                duration,
                recovered_failures,
            } => tracing::info!(
                target: "trio.turn",
                move_number, %player, row, col, %mode,
                duration_ms = duration.as_millis(), recovered_failures,
                "turn resolved"
            ),
            TelemetryEvent::TurnFailed {
                move_number,
                player,
                kind,
                duration,
            } => tracing::warn!(
                target: "trio.turn",
                move_number, %player, %kind, duration_ms = duration.as_millis(),
                "turn failed"
            ),
            other => tracing::debug!(target: "trio.telemetry", event = ?other, "telemetry"),
        }
    }
}
