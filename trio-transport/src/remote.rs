//! JSON-RPC 2.0 over HTTP POST worker client.

use crate::error::map_reqwest_error;
use crate::jsonrpc::{JsonRpcRequest, JsonRpcResponse, METHOD_CALL, METHOD_DESCRIBE, METHOD_LIST};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use trio_protocol::{
    Arguments, CapabilityDescriptor, DurationMs, InvocationError, InvocationResponse,
    RequestIdGen, TransportKind, WorkerClient, WorkerIdentity, WorkerRole,
};

/// Calls a worker served by [`WorkerServer`](crate::WorkerServer) (or any
/// peer speaking the same envelope).
///
/// Every request is one HTTP exchange raced against the deadline. A reply
/// that arrives after the deadline is dropped with the exchange, and a reply
/// whose `id` does not match the request is a `TransportError`. The remote
/// handler is not told about the timeout.
#[derive(Debug)]
pub struct RemoteClient {
    identity: WorkerIdentity,
    http: reqwest::Client,
    url: String,
    ids: RequestIdGen,
}

impl RemoteClient {
    /// Client for the worker at `url` (e.g. `http://127.0.0.1:3001/mcp`).
    pub fn new(role: WorkerRole, url: impl Into<String>) -> Self {
        Self::with_http_client(role, url, reqwest::Client::new())
    }

    /// Client sharing an existing `reqwest` connection pool.
    pub fn with_http_client(role: WorkerRole, url: impl Into<String>, http: reqwest::Client) -> Self {
        let url = url.into();
        Self {
            identity: WorkerIdentity::new(role, TransportKind::Remote, url.clone()),
            http,
            url,
            ids: RequestIdGen::new(),
        }
    }

    async fn rpc(&self, method: &str, params: Value, deadline: DurationMs) -> Result<Value, InvocationError> {
        let id = self.ids.next_id();
        let request = JsonRpcRequest::new(id.get(), method, params);

        let exchange = async {
            let response = self
                .http
                .post(&self.url)
                .json(&request)
                .send()
                .await
                .map_err(|e| map_reqwest_error(e, deadline))?;
            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| map_reqwest_error(e, deadline))?;
            serde_json::from_str::<JsonRpcResponse>(&text).map_err(|e| {
                InvocationError::transport(format!("HTTP {status}: undecodable response: {e}"))
            })
        };

        let response = match tokio::time::timeout(deadline.to_std(), exchange).await {
            Ok(response) => response?,
            Err(_) => {
                tracing::debug!(worker = %self.identity, method, %deadline, "remote call timed out");
                return Err(InvocationError::timeout(deadline));
            }
        };

        if response.id.as_ref().and_then(Value::as_u64) != Some(id.get()) {
            return Err(InvocationError::transport(format!(
                "response id {:?} does not match request id {id}",
                response.id
            )));
        }
        response.into_result()
    }
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, InvocationError> {
    serde_json::from_value(value)
        .map_err(|e| InvocationError::transport(format!("malformed {what}: {e}")))
}

#[async_trait]
impl WorkerClient for RemoteClient {
    fn identity(&self) -> &WorkerIdentity {
        &self.identity
    }

    async fn call(
        &self,
        capability: &str,
        arguments: Arguments,
        deadline: DurationMs,
    ) -> InvocationResponse {
        let params = json!({
            "name": capability,
            "arguments": arguments,
            "_meta": { "deadline_ms": deadline.as_millis() },
        });
        self.rpc(METHOD_CALL, params, deadline).await.into()
    }

    async fn list_capabilities(
        &self,
        deadline: DurationMs,
    ) -> Result<Vec<CapabilityDescriptor>, InvocationError> {
        let mut result = self.rpc(METHOD_LIST, json!({}), deadline).await?;
        let tools = result
            .get_mut("tools")
            .map(Value::take)
            .unwrap_or(Value::Null);
        decode(tools, "tool list")
    }

    async fn describe(
        &self,
        name: &str,
        deadline: DurationMs,
    ) -> Result<CapabilityDescriptor, InvocationError> {
        let result = self
            .rpc(METHOD_DESCRIBE, json!({ "name": name }), deadline)
            .await?;
        decode(result, "descriptor")
    }
}
