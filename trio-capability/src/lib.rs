//! # trio-capability: what a worker can do
//!
//! A worker exposes named capabilities. Handlers are written against the
//! typed [`Capability`] trait (decoded argument struct, schema generated
//! with `schemars`); the [`CapabilityRegistry`] stores them type-erased as
//! [`CapabilityDyn`] so they can be looked up by name at the transport
//! boundary and listed for discovery.
//!
//! The registry is plain data. It performs no I/O and needs no locking once
//! built.

#![deny(missing_docs)]

pub mod capability;
pub mod registry;

pub use capability::{
    Capability, CapabilityContext, CapabilityDyn, CapabilityError, FnCapability,
};
pub use registry::{CapabilityRegistry, RegistryError};
