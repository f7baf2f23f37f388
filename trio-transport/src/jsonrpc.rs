//! JSON-RPC 2.0 envelope used by the remote transport.
//!
//! ```text
//! → {"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"decide","arguments":{..}}}
//! ← {"jsonrpc":"2.0","id":7,"result":{..}}
//! ← {"jsonrpc":"2.0","id":7,"error":{"code":-32603,"message":"..","data":{"kind":"handler_error"}}}
//! ```
//!
//! `data.kind` carries the exact [`ErrorKind`] so the client can rebuild the
//! same failure the endpoint produced. Peers that omit it are mapped by code.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use trio_protocol::{ErrorKind, InvocationError};

/// Protocol version string.
pub const VERSION: &str = "2.0";

/// List the worker's capabilities.
pub const METHOD_LIST: &str = "tools/list";
/// Invoke one capability.
pub const METHOD_CALL: &str = "tools/call";
/// Describe one capability.
pub const METHOD_DESCRIBE: &str = "tools/describe";

/// Invalid JSON was received.
pub const PARSE_ERROR: i64 = -32700;
/// The JSON sent is not a valid request object.
pub const INVALID_REQUEST: i64 = -32600;
/// The method (or capability) does not exist.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Invalid method parameters.
pub const INVALID_PARAMS: i64 = -32602;
/// Internal error, including handler failures.
pub const INTERNAL_ERROR: i64 = -32603;

/// A request envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Must be `"2.0"`.
    pub jsonrpc: String,
    /// Correlation id. Absent on notifications.
    #[serde(default)]
    pub id: Option<Value>,
    /// Method name.
    pub method: String,
    /// Method parameters.
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// A request with a numeric id.
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: VERSION.to_string(),
            id: Some(Value::from(id)),
            method: method.into(),
            params: Some(params),
        }
    }
}

/// A response envelope. Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// Id of the request this answers; `null` when it could not be read.
    pub id: Option<Value>,
    /// Present on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Present on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// A success response.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// An error response.
    pub fn error(id: Option<Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// The result, or the error translated back into the taxonomy.
    pub fn into_result(self) -> Result<Value, InvocationError> {
        match (self.error, self.result) {
            (Some(error), _) => Err(error.to_invocation_error()),
            (None, Some(result)) => Ok(result),
            (None, None) => Err(InvocationError::transport(
                "response carries neither result nor error",
            )),
        }
    }
}

/// The `error` member of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Numeric error code.
    pub code: i64,
    /// Short description.
    pub message: String,
    /// Extra detail; `{"kind": <ErrorKind>}` when produced by a trio worker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// An error without `data`.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// The wire form of an invocation failure.
    pub fn from_invocation(err: &InvocationError) -> Self {
        Self {
            code: code_for(err.kind),
            message: err.message.clone(),
            data: Some(serde_json::json!({ "kind": err.kind })),
        }
    }

    /// The failure this error stands for: `data.kind` when present and
    /// known, otherwise inferred from the code.
    pub fn to_invocation_error(&self) -> InvocationError {
        let kind = self
            .data
            .as_ref()
            .and_then(|d| d.get("kind"))
            .and_then(|k| serde_json::from_value::<ErrorKind>(k.clone()).ok())
            .unwrap_or_else(|| kind_for(self.code));
        InvocationError::new(kind, self.message.clone())
    }
}

/// JSON-RPC code for an error kind.
pub fn code_for(kind: ErrorKind) -> i64 {
    match kind {
        ErrorKind::CapabilityNotFound => METHOD_NOT_FOUND,
        ErrorKind::InvalidArguments => INVALID_PARAMS,
        _ => INTERNAL_ERROR,
    }
}

/// Error kind for a JSON-RPC code. Protocol-level codes mean the peers do
/// not understand each other and count as transport failures.
pub fn kind_for(code: i64) -> ErrorKind {
    match code {
        METHOD_NOT_FOUND => ErrorKind::CapabilityNotFound,
        INVALID_PARAMS => ErrorKind::InvalidArguments,
        INTERNAL_ERROR => ErrorKind::HandlerError,
        _ => ErrorKind::TransportError,
    }
}
