//! MemorySink: an append-only in-memory event log.

use serde::Serialize;
use std::sync::Mutex;
use trio_protocol::{TelemetryEvent, TelemetrySink};

/// One event with its position in the log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recorded {
    /// 1-based, strictly increasing, no gaps.
    pub seq: u64,
    /// The event.
    pub event: TelemetryEvent,
}

/// A sink that keeps every event in order of arrival.
///
/// Safe for concurrent writers: appends are serialized by a mutex and each
/// gets the next sequence number.
#[derive(Debug, Default)]
pub struct MemorySink {
    log: Mutex<Vec<Recorded>>,
}

impl MemorySink {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event recorded so far, oldest first.
    pub fn snapshot(&self) -> Vec<TelemetryEvent> {
        self.with_log(|log| log.iter().map(|r| r.event.clone()).collect())
    }

    /// Records with a sequence number greater than `seq`.
    pub fn since(&self, seq: u64) -> Vec<Recorded> {
        self.with_log(|log| log.iter().filter(|r| r.seq > seq).cloned().collect())
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.with_log(|log| log.len())
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sequence number of the newest record, `0` when empty.
    pub fn last_seq(&self) -> u64 {
        self.with_log(|log| log.last().map_or(0, |r| r.seq))
    }

    fn with_log<T: Default>(&self, f: impl FnOnce(&Vec<Recorded>) -> T) -> T {
        self.log.lock().map(|log| f(&*log)).unwrap_or_default()
    }
}

impl TelemetrySink for MemorySink {
    fn record(&self, event: TelemetryEvent) {
        if let Ok(mut log) = self.log.lock() {
            let seq = log.len() as u64 + 1;
            log.push(Recorded { seq, event });
        }
    }
}
