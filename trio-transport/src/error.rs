//! Errors raised outside a call, and the mapping of HTTP client errors onto
//! the invocation taxonomy.

use thiserror::Error;
use trio_protocol::{DurationMs, InvocationError};

/// Failure to start or run a worker server.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The bound socket has no readable local address.
    #[error("failed to read local address: {0}")]
    LocalAddr(#[source] std::io::Error),
    /// The server stopped with an I/O error.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
    /// The server task panicked or was aborted.
    #[error("server task failed: {0}")]
    Task(String),
}

impl ServerError {
    pub(crate) fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }
}

/// Map a [`reqwest::Error`] to an [`InvocationError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error, deadline: DurationMs) -> InvocationError {
    if err.is_timeout() {
        InvocationError::timeout(deadline)
    } else if err.is_connect() {
        InvocationError::transport(format!("connection failed: {err}"))
    } else {
        InvocationError::transport(err.to_string())
    }
}
