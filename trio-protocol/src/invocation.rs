//! Invocation request and response: one call, one answer.

use crate::{DurationMs, ErrorKind, InvocationError, RequestId};
use serde::{Deserialize, Serialize};

/// Named arguments of a capability call.
pub type Arguments = serde_json::Map<String, serde_json::Value>;

/// A single capability call. Created per call by a worker client, never
/// shared, and discarded once the matching response (or the deadline)
/// arrives.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRequest {
    /// Capability to invoke.
    pub capability_name: String,
    /// Named arguments.
    #[serde(default)]
    pub arguments: Arguments,
    /// Correlates the response with this request.
    pub request_id: RequestId,
    /// How long the caller is willing to wait.
    pub deadline: DurationMs,
}

impl InvocationRequest {
    /// Create a new request.
    pub fn new(
        capability_name: impl Into<String>,
        arguments: Arguments,
        request_id: RequestId,
        deadline: DurationMs,
    ) -> Self {
        Self {
            capability_name: capability_name.into(),
            arguments,
            request_id,
            deadline,
        }
    }
}

/// The answer to an [`InvocationRequest`]. Produced exactly once per
/// request; a transport that drops the answer is turned into a
/// `Failure(Timeout)` by the client once the deadline passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvocationResponse {
    /// The handler produced a result.
    Success {
        /// The handler's result.
        result: serde_json::Value,
    },
    /// The call failed somewhere between caller and handler.
    Failure {
        /// What went wrong.
        error_kind: ErrorKind,
        /// Detail for logs and traces.
        message: String,
    },
}

impl InvocationResponse {
    /// A successful response.
    pub fn success(result: serde_json::Value) -> Self {
        Self::Success { result }
    }

    /// A failed response.
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Failure {
            error_kind: kind,
            message: message.into(),
        }
    }

    /// Whether this is a `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The error kind of a `Failure`, `None` for `Success`.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error_kind, .. } => Some(*error_kind),
        }
    }

    /// Convert into a `Result` so callers can use `?` and branch on kind.
    pub fn into_result(self) -> Result<serde_json::Value, InvocationError> {
        match self {
            Self::Success { result } => Ok(result),
            Self::Failure {
                error_kind,
                message,
            } => Err(InvocationError::new(error_kind, message)),
        }
    }
}

impl From<InvocationError> for InvocationResponse {
    fn from(err: InvocationError) -> Self {
        Self::Failure {
            error_kind: err.kind,
            message: err.message,
        }
    }
}

impl From<Result<serde_json::Value, InvocationError>> for InvocationResponse {
    fn from(result: Result<serde_json::Value, InvocationError>) -> Self {
        match result {
            Ok(result) => Self::Success { result },
            Err(err) => err.into(),
        }
    }
}
