//! Stage deadlines and measured timings, in whole milliseconds.
//!
//! Deadlines travel in config files (`analyze = 2000`), in JSON-RPC calls
//! (`params._meta.deadline_ms`) and in telemetry records. All three carry
//! the bare integer, so [`DurationMs`] is serde-transparent over `u64`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A stage deadline or a measured stage time.
///
/// Conversions from [`Duration`] truncate to the millisecond and saturate
/// at `u64::MAX`, so a measured time never wraps.
///
/// ```
/// use trio_protocol::DurationMs;
///
/// let analyze = DurationMs::from_secs(2);
/// let total = analyze.saturating_add(DurationMs::from_millis(500));
/// assert_eq!(total.to_string(), "2500ms");
/// assert_eq!(serde_json::to_value(total).unwrap(), serde_json::json!(2500));
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DurationMs(u64);

impl DurationMs {
    /// No time at all. Rejected as a deadline by config validation.
    pub const ZERO: Self = Self(0);

    /// `ms` milliseconds.
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// `secs` seconds, saturating.
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// Whole milliseconds.
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// For `tokio::time::timeout` and friends.
    pub fn to_std(&self) -> Duration {
        Duration::from_millis(self.0)
    }

    /// Adds stage deadlines into a turn bound without overflowing.
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Whether no time is allowed.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<Duration> for DurationMs {
    fn from(d: Duration) -> Self {
        Self(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

impl From<DurationMs> for Duration {
    fn from(d: DurationMs) -> Self {
        d.to_std()
    }
}

impl std::fmt::Display for DurationMs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measured_time_truncates_to_millis() {
        let d = DurationMs::from(Duration::from_micros(1_999));
        assert_eq!(d, DurationMs::from_millis(1));
    }

    #[test]
    fn sums_saturate() {
        let big = DurationMs::from_millis(u64::MAX);
        assert_eq!(big.saturating_add(DurationMs::from_secs(1)), big);
        assert_eq!(DurationMs::from_secs(u64::MAX), big);
    }

    #[test]
    fn reads_bare_integers() {
        let d: DurationMs = serde_json::from_str("750").unwrap();
        assert_eq!(d.to_std(), Duration::from_millis(750));
        assert!(!d.is_zero());
        assert!(DurationMs::default().is_zero());
    }
}
