//! # trio-transport: reaching workers
//!
//! Two [`WorkerClient`](trio_protocol::WorkerClient) implementations with
//! identical success and failure shapes:
//!
//! - [`LocalClient`] calls an in-process [`WorkerEndpoint`](trio_worker::WorkerEndpoint)
//! - [`RemoteClient`] speaks JSON-RPC 2.0 over HTTP POST
//!
//! and the worker side of the remote transport: [`RpcRouter`] (transport
//! agnostic dispatch) and [`WorkerServer`] (axum).
//!
//! Error codes on the wire:
//!
//! | Kind | Code |
//! |------|------|
//! | `capability_not_found` | `-32601` |
//! | `invalid_arguments` | `-32602` |
//! | everything else | `-32603` |
//!
//! The exact kind travels in `error.data.kind`.

#![deny(missing_docs)]

pub mod error;
pub mod jsonrpc;
pub mod local;
pub mod remote;
pub mod router;
pub mod server;

pub use error::ServerError;
pub use local::LocalClient;
pub use remote::RemoteClient;
pub use router::RpcRouter;
pub use server::{WorkerServer, app, serve};
