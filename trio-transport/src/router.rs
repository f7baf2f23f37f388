//! Transport-agnostic JSON-RPC dispatch onto a [`WorkerEndpoint`].
//!
//! The HTTP server feeds request bodies in; anything else that can carry a
//! JSON value (a socket, a test) can do the same.

use crate::jsonrpc::{
    INVALID_PARAMS, INVALID_REQUEST, JsonRpcError, JsonRpcRequest, JsonRpcResponse, METHOD_CALL,
    METHOD_DESCRIBE, METHOD_LIST, METHOD_NOT_FOUND, PARSE_ERROR, VERSION,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use trio_capability::CapabilityContext;
use trio_protocol::{Arguments, DurationMs, InvocationError, InvocationResponse, RequestId};
use trio_worker::WorkerEndpoint;

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Arguments,
    #[serde(default, rename = "_meta")]
    meta: CallMeta,
}

#[derive(Debug, Default, Deserialize)]
struct CallMeta {
    #[serde(default)]
    deadline_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct DescribeParams {
    name: String,
}

/// Routes JSON-RPC requests to one worker endpoint.
#[derive(Debug, Clone)]
pub struct RpcRouter {
    endpoint: Arc<WorkerEndpoint>,
}

impl RpcRouter {
    /// Route to `endpoint`.
    pub fn new(endpoint: Arc<WorkerEndpoint>) -> Self {
        Self { endpoint }
    }

    /// The endpoint behind this router.
    pub fn endpoint(&self) -> &Arc<WorkerEndpoint> {
        &self.endpoint
    }

    /// Handle a raw request body. Undecodable input yields a
    /// `PARSE_ERROR` response with a `null` id.
    pub async fn handle_str(&self, body: &str) -> Value {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => self.handle_value(value).await,
            Err(e) => to_value(JsonRpcResponse::error(
                None,
                JsonRpcError::new(PARSE_ERROR, format!("parse error: {e}")),
            )),
        }
    }

    /// Handle an already-parsed request.
    pub async fn handle_value(&self, value: Value) -> Value {
        let id = value.get("id").cloned();
        let response = match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => JsonRpcResponse::error(
                id,
                JsonRpcError::new(INVALID_REQUEST, format!("invalid request: {e}")),
            ),
        };
        to_value(response)
    }

    /// Dispatch a decoded request by method.
    pub async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id;
        if request.jsonrpc != VERSION {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::new(
                    INVALID_REQUEST,
                    format!("unsupported jsonrpc version: {}", request.jsonrpc),
                ),
            );
        }
        let params = request.params.unwrap_or(Value::Null);

        match request.method.as_str() {
            METHOD_LIST => {
                JsonRpcResponse::success(id, json!({ "tools": self.endpoint.list_capabilities() }))
            }
            METHOD_CALL => {
                let params: CallParams = match decode_params(params) {
                    Ok(p) => p,
                    Err(e) => return JsonRpcResponse::error(id, e),
                };
                let request_id = RequestId::new(id.as_ref().and_then(Value::as_u64).unwrap_or(0));
                let deadline = params
                    .meta
                    .deadline_ms
                    .map(DurationMs::from_millis)
                    .unwrap_or_default();
                let ctx = CapabilityContext::new(request_id, deadline);
                match self
                    .endpoint
                    .invoke(&params.name, params.arguments, ctx)
                    .await
                {
                    InvocationResponse::Success { result } => JsonRpcResponse::success(id, result),
                    InvocationResponse::Failure {
                        error_kind,
                        message,
                    } => JsonRpcResponse::error(
                        id,
                        JsonRpcError::from_invocation(&InvocationError::new(error_kind, message)),
                    ),
                }
            }
            METHOD_DESCRIBE => {
                let params: DescribeParams = match decode_params(params) {
                    Ok(p) => p,
                    Err(e) => return JsonRpcResponse::error(id, e),
                };
                match self.endpoint.describe(&params.name) {
                    Ok(descriptor) => JsonRpcResponse::success(id, to_value(descriptor)),
                    Err(e) => JsonRpcResponse::error(id, JsonRpcError::from_invocation(&e)),
                }
            }
            other => JsonRpcResponse::error(
                id,
                JsonRpcError::new(METHOD_NOT_FOUND, format!("method not found: {other}")),
            ),
        }
    }
}

fn decode_params<T: DeserializeOwned>(params: Value) -> Result<T, JsonRpcError> {
    serde_json::from_value(params).map_err(|e| {
        let mut err = JsonRpcError::new(INVALID_PARAMS, format!("invalid params: {e}"));
        err.data = Some(json!({ "kind": trio_protocol::ErrorKind::InvalidArguments }));
        err
    })
}

fn to_value<T: serde::Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
