//! A client that answers every capability from a canned table.

use super::scripted_identity;
use crate::{
    Arguments, CapabilityDescriptor, DurationMs, InvocationError, InvocationResponse,
    WorkerClient, WorkerIdentity, WorkerRole,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// A client that returns a fixed result per capability name and records
/// the arguments it was called with. Unknown names answer
/// `CapabilityNotFound`.
pub struct FixedClient {
    identity: WorkerIdentity,
    results: BTreeMap<String, serde_json::Value>,
    seen: Mutex<Vec<(String, Arguments)>>,
}

impl FixedClient {
    /// Create an empty client in the given role.
    pub fn new(role: WorkerRole) -> Self {
        Self {
            identity: scripted_identity(role, "fixed"),
            results: BTreeMap::new(),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Answer `capability` with `result`.
    pub fn with(mut self, capability: impl Into<String>, result: serde_json::Value) -> Self {
        self.results.insert(capability.into(), result);
        self
    }

    /// Snapshot of every `(capability, arguments)` pair received.
    pub fn seen(&self) -> Vec<(String, Arguments)> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl WorkerClient for FixedClient {
    fn identity(&self) -> &WorkerIdentity {
        &self.identity
    }

    async fn call(
        &self,
        capability: &str,
        arguments: Arguments,
        _deadline: DurationMs,
    ) -> InvocationResponse {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push((capability.to_string(), arguments));
        }
        match self.results.get(capability) {
            Some(result) => InvocationResponse::success(result.clone()),
            None => InvocationError::not_found(capability).into(),
        }
    }

    async fn list_capabilities(
        &self,
        _deadline: DurationMs,
    ) -> Result<Vec<CapabilityDescriptor>, InvocationError> {
        Ok(self
            .results
            .keys()
            .map(|name| {
                CapabilityDescriptor::new(
                    name.clone(),
                    "scripted",
                    serde_json::json!({"type": "object"}),
                )
            })
            .collect())
    }

    async fn describe(
        &self,
        name: &str,
        deadline: DurationMs,
    ) -> Result<CapabilityDescriptor, InvocationError> {
        self.list_capabilities(deadline)
            .await?
            .into_iter()
            .find(|d| d.name == name)
            .ok_or_else(|| InvocationError::not_found(name))
    }
}
