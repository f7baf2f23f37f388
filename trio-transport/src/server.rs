//! HTTP server exposing a [`WorkerEndpoint`] over JSON-RPC 2.0.
//!
//! | Route | Answer |
//! |-------|--------|
//! | `POST /mcp` | a JSON-RPC response (`tools/list`, `tools/call`, `tools/describe`) |
//! | `GET /mcp` | server info and the tool list |
//! | `GET /health` | status, role, capability count and endpoint stats |

use crate::error::ServerError;
use crate::router::RpcRouter;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use trio_worker::WorkerEndpoint;

/// The axum application for one endpoint.
pub fn app(endpoint: Arc<WorkerEndpoint>) -> Router {
    Router::new()
        .route("/mcp", post(rpc).get(info))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(RpcRouter::new(endpoint))
}

/// Serve `endpoint` on `listener` until the server fails.
pub async fn serve(listener: TcpListener, endpoint: Arc<WorkerEndpoint>) -> Result<(), ServerError> {
    axum::serve(listener, app(endpoint))
        .await
        .map_err(ServerError::Serve)
}

/// A worker server running in a background task.
#[derive(Debug)]
pub struct WorkerServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    task: JoinHandle<Result<(), ServerError>>,
}

impl WorkerServer {
    /// Bind `addr` (e.g. `"127.0.0.1:3001"`, or port `0` for an ephemeral
    /// port) and start serving.
    pub async fn bind(addr: &str, endpoint: Arc<WorkerEndpoint>) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::bind(addr, e))?;
        Self::start(listener, endpoint)
    }

    /// Start serving on an already-bound listener. Must be called inside a
    /// tokio runtime.
    pub fn start(listener: TcpListener, endpoint: Arc<WorkerEndpoint>) -> Result<Self, ServerError> {
        let addr = listener.local_addr().map_err(ServerError::LocalAddr)?;
        let role = endpoint.role();
        let shutdown = CancellationToken::new();
        let signal = shutdown.clone();
        let app = app(endpoint);
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { signal.cancelled().await })
                .await
                .map_err(ServerError::Serve)
        });
        tracing::info!(%addr, %role, "worker server listening");
        Ok(Self {
            addr,
            shutdown,
            task,
        })
    }

    /// Address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// JSON-RPC URL for a `RemoteClient`.
    pub fn url(&self) -> String {
        format!("http://{}/mcp", self.addr)
    }

    /// Stop accepting connections and wait for the server task to end.
    pub async fn shutdown(self) -> Result<(), ServerError> {
        self.shutdown.cancel();
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(ServerError::Task(e.to_string())),
        }
    }
}

async fn rpc(State(router): State<RpcRouter>, body: String) -> Json<Value> {
    Json(router.handle_str(&body).await)
}

async fn info(State(router): State<RpcRouter>) -> Json<Value> {
    let endpoint = router.endpoint();
    Json(json!({
        "name": format!("trio-{}", endpoint.role()),
        "version": env!("CARGO_PKG_VERSION"),
        "role": endpoint.role(),
        "protocol": "jsonrpc-2.0",
        "tools": endpoint.list_capabilities(),
    }))
}

async fn health(State(router): State<RpcRouter>) -> Json<Value> {
    let endpoint = router.endpoint();
    Json(json!({
        "status": "ok",
        "role": endpoint.role(),
        "capability_count": endpoint.capability_count(),
        "stats": endpoint.stats(),
    }))
}
