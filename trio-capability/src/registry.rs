//! Capability registry: register once, look up by name, list for discovery.

use crate::capability::{Capability, CapabilityContext, CapabilityDyn, CapabilityError, FnCapability};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use trio_protocol::{Arguments, CapabilityDescriptor, ErrorKind, InvocationError};

/// Registry errors.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A capability with this name is already registered.
    #[error("duplicate capability: {0}")]
    DuplicateCapability(String),
    /// No capability with this name.
    #[error("capability not found: {0}")]
    CapabilityNotFound(String),
}

impl From<RegistryError> for InvocationError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::CapabilityNotFound(name) => InvocationError::not_found(&name),
            RegistryError::DuplicateCapability(name) => InvocationError::new(
                ErrorKind::HandlerError,
                format!("duplicate capability: {name}"),
            ),
        }
    }
}

/// Name-keyed map of capabilities owned by one worker.
///
/// Built at startup and then handed to an endpoint, which only reads it.
/// Names iterate in sorted order, so listings are stable.
#[derive(Default, Clone)]
pub struct CapabilityRegistry {
    capabilities: BTreeMap<String, Arc<dyn CapabilityDyn>>,
}

impl CapabilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strongly-typed capability.
    pub fn register<T: Capability + 'static>(&mut self, capability: T) -> Result<(), RegistryError> {
        self.register_dyn(Arc::new(capability))
    }

    /// Register a pre-erased capability.
    pub fn register_dyn(&mut self, capability: Arc<dyn CapabilityDyn>) -> Result<(), RegistryError> {
        let name = capability.name().to_string();
        if self.capabilities.contains_key(&name) {
            return Err(RegistryError::DuplicateCapability(name));
        }
        self.capabilities.insert(name, capability);
        Ok(())
    }

    /// Register a closure with an explicit schema and description.
    pub fn register_fn<F, Fut>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
        handler: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(Arguments, CapabilityContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, CapabilityError>> + Send + 'static,
    {
        self.register_dyn(Arc::new(FnCapability::new(
            name,
            description,
            input_schema,
            handler,
        )))
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<T: Capability + 'static>(mut self, capability: T) -> Result<Self, RegistryError> {
        self.register(capability)?;
        Ok(self)
    }

    /// Look up a capability by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn CapabilityDyn>, RegistryError> {
        self.capabilities
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::CapabilityNotFound(name.to_string()))
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    /// Lazily project every capability to its descriptor, in name order.
    /// Finite, side-effect free, and restartable by calling again.
    pub fn list(&self) -> impl Iterator<Item = CapabilityDescriptor> + '_ {
        self.capabilities.values().map(|c| c.descriptor())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.capabilities.keys().map(String::as_str)
    }

    /// Number of capabilities.
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Whether no capability is registered.
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("capabilities", &self.capabilities.keys().collect::<Vec<_>>())
            .finish()
    }
}
