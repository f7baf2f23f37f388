//! FanoutSink: hands each event to several sinks in registration order.

use std::sync::Arc;
use trio_protocol::{TelemetryEvent, TelemetrySink};

/// Dispatches every event to each registered sink, in the order the sinks
/// were added.
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn TelemetrySink>>,
}

impl FanoutSink {
    /// Create an empty fan-out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink to the end of the list.
    pub fn add(&mut self, sink: Arc<dyn TelemetrySink>) {
        self.sinks.push(sink);
    }

    /// Builder form of [`add`](Self::add).
    pub fn with(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.add(sink);
        self
    }

    /// Number of sinks.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether no sink is registered.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl TelemetrySink for FanoutSink {
    fn record(&self, event: TelemetryEvent) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.record(event.clone());
            }
            last.record(event);
        }
    }
}

impl std::fmt::Debug for FanoutSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutSink")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
