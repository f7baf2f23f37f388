//! The Worker Endpoint: resolves requests against a registry and turns
//! every outcome, including handler panics, into an [`InvocationResponse`].

use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use trio_capability::{CapabilityContext, CapabilityRegistry};
use trio_protocol::{
    Arguments, CapabilityDescriptor, DurationMs, InvocationError, InvocationRequest,
    InvocationResponse, NullSink, Outcome, TelemetryEvent, TelemetrySink, WorkerRole,
};

/// Counters an endpoint keeps about the calls it served.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EndpointStats {
    /// Invocations received.
    pub request_count: u64,
    /// Invocations that ended in `Failure`.
    pub failure_count: u64,
    /// Sum of invocation durations.
    pub total_response_time: DurationMs,
    /// Unix time of the most recent invocation, in milliseconds.
    pub last_request_at_ms: Option<u64>,
}

impl EndpointStats {
    /// Mean invocation duration in milliseconds, `0.0` before the first call.
    pub fn average_response_ms(&self) -> f64 {
        if self.request_count == 0 {
            0.0
        } else {
            self.total_response_time.as_millis() as f64 / self.request_count as f64
        }
    }

    fn record(&mut self, duration: DurationMs, failed: bool) {
        self.request_count += 1;
        if failed {
            self.failure_count += 1;
        }
        self.total_response_time = self.total_response_time.saturating_add(duration);
        self.last_request_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|d| DurationMs::from(d).as_millis());
    }
}

/// One worker's request handler.
///
/// Owns its [`CapabilityRegistry`] exclusively; the registry cannot change
/// after construction. Invocations are independent of each other and may
/// run concurrently.
pub struct WorkerEndpoint {
    role: WorkerRole,
    registry: CapabilityRegistry,
    telemetry: Arc<dyn TelemetrySink>,
    stats: Mutex<EndpointStats>,
}

impl WorkerEndpoint {
    /// Wrap a registry. Telemetry goes nowhere until
    /// [`with_telemetry`](Self::with_telemetry) is called.
    pub fn new(role: WorkerRole, registry: CapabilityRegistry) -> Self {
        Self {
            role,
            registry,
            telemetry: Arc::new(NullSink),
            stats: Mutex::new(EndpointStats::default()),
        }
    }

    /// Report invocations to `sink`.
    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = sink;
        self
    }

    /// The role this endpoint serves.
    pub fn role(&self) -> WorkerRole {
        self.role
    }

    /// Every capability's descriptor, in name order. Always succeeds.
    pub fn list_capabilities(&self) -> Vec<CapabilityDescriptor> {
        self.registry.list().collect()
    }

    /// Number of registered capabilities.
    pub fn capability_count(&self) -> usize {
        self.registry.len()
    }

    /// One capability's descriptor.
    pub fn describe(&self, name: &str) -> Result<CapabilityDescriptor, InvocationError> {
        Ok(self.registry.get(name)?.descriptor())
    }

    /// Snapshot of the endpoint's counters.
    pub fn stats(&self) -> EndpointStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Serve an [`InvocationRequest`].
    pub async fn handle(&self, request: InvocationRequest) -> InvocationResponse {
        let ctx = CapabilityContext::new(request.request_id, request.deadline);
        self.invoke(&request.capability_name, request.arguments, ctx)
            .await
    }

    /// Look up `name` and run its handler. Never panics: a missing
    /// capability is `CapabilityNotFound`, bad arguments are
    /// `InvalidArguments`, and a handler error or panic is `HandlerError`.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: Arguments,
        ctx: CapabilityContext,
    ) -> InvocationResponse {
        let start = Instant::now();
        let result = match self.registry.get(name) {
            Err(e) => Err(InvocationError::from(e)),
            // Building the handler future runs user code too, so it stays
            // inside the guard.
            Ok(capability) => AssertUnwindSafe(async { capability.call_dyn(arguments, &ctx).await })
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| {
                    Err(trio_capability::CapabilityError::Handler(format!(
                        "handler panicked: {}",
                        panic_message(panic.as_ref())
                    )))
                })
                .map_err(InvocationError::from),
        };
        let duration = DurationMs::from(start.elapsed());

        let outcome = match &result {
            Ok(_) => {
                tracing::debug!(role = %self.role, capability = name, %duration, "invocation ok");
                Outcome::Success
            }
            Err(e) => {
                tracing::debug!(role = %self.role, capability = name, %duration, error = %e, "invocation failed");
                Outcome::Failure { kind: e.kind }
            }
        };
        if let Ok(mut stats) = self.stats.lock() {
            stats.record(duration, result.is_err());
        }
        self.telemetry.record(TelemetryEvent::Invocation {
            role: self.role,
            capability: name.to_string(),
            duration,
            outcome,
        });
        result.into()
    }
}

impl std::fmt::Debug for WorkerEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerEndpoint")
            .field("role", &self.role)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
