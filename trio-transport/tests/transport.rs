use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use trio_capability::{CapabilityContext, CapabilityRegistry};
use trio_game::{Board, Decision, Mark, Observation, Position};
use trio_protocol::*;
use trio_transport::jsonrpc::{
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};
use trio_transport::{LocalClient, RemoteClient, RpcRouter, WorkerServer};
use trio_worker::{WorkerEndpoint, endpoint_for};

fn args(value: Value) -> Arguments {
    match value {
        Value::Object(map) => map,
        _ => panic!("arguments must be an object"),
    }
}

fn role_endpoint(role: WorkerRole) -> Arc<WorkerEndpoint> {
    Arc::new(endpoint_for(role, Arc::new(NullSink)).unwrap())
}

/// An endpoint with a `slow` capability that records whether it saw
/// cancellation.
fn slow_endpoint(cancelled: Arc<AtomicBool>) -> Arc<WorkerEndpoint> {
    let mut registry = CapabilityRegistry::new();
    registry
        .register_fn(
            "slow",
            "Sleeps for 500ms unless cancelled",
            json!({"type": "object"}),
            move |_, ctx: CapabilityContext| {
                let cancelled = Arc::clone(&cancelled);
                async move {
                    tokio::select! {
                        _ = ctx.cancellation_token.cancelled() => cancelled.store(true, Ordering::SeqCst),
                        _ = tokio::time::sleep(Duration::from_millis(500)) => {}
                    }
                    Ok(json!("done"))
                }
            },
        )
        .unwrap();
    Arc::new(WorkerEndpoint::new(WorkerRole::Strategist, registry))
}

fn decide_args() -> Arguments {
    let observation = Observation::bare(Board::from_rows(["XX.", ".O.", "..."]), Mark::O);
    args(json!({ "observation": observation }))
}

const DEADLINE: DurationMs = DurationMs::from_millis(2_000);

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Router
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn router_lists_tools() {
    let router = RpcRouter::new(role_endpoint(WorkerRole::Scout));
    let resp = router
        .handle_value(json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}))
        .await;
    assert_eq!(resp["id"], json!(1));
    let tools = resp["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 3);
    assert_eq!(tools[0]["name"], json!("analyze"));
    assert!(tools[0]["inputSchema"].is_object());
}

#[tokio::test]
async fn router_calls_capability() {
    let router = RpcRouter::new(role_endpoint(WorkerRole::Strategist));
    let resp = router
        .handle_value(json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "tools/call",
            "params": {"name": "decide", "arguments": decide_args()}
        }))
        .await;
    assert!(resp.get("error").is_none());
    assert_eq!(resp["result"]["position"], json!({"row": 0, "col": 2}));
}

#[tokio::test]
async fn router_error_codes() {
    let router = RpcRouter::new(role_endpoint(WorkerRole::Executor));

    let resp = router
        .handle_value(json!({
            "jsonrpc": "2.0", "id": 1, "method": "tools/call",
            "params": {"name": "analyze", "arguments": {}}
        }))
        .await;
    assert_eq!(resp["error"]["code"], json!(METHOD_NOT_FOUND));
    assert_eq!(resp["error"]["data"]["kind"], json!("capability_not_found"));

    let resp = router
        .handle_value(json!({
            "jsonrpc": "2.0", "id": 2, "method": "tools/call",
            "params": {"name": "act", "arguments": {"board": 7}}
        }))
        .await;
    assert_eq!(resp["error"]["code"], json!(INVALID_PARAMS));

    let resp = router
        .handle_value(json!({
            "jsonrpc": "2.0", "id": 3, "method": "tools/call",
            "params": {"name": "act", "arguments": {"board": [["X","O","X"],["X","O","O"],["O","X","X"]]}}
        }))
        .await;
    assert_eq!(resp["error"]["code"], json!(INTERNAL_ERROR));
    assert_eq!(resp["error"]["data"]["kind"], json!("handler_error"));

    let resp = router
        .handle_value(json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {}}))
        .await;
    assert_eq!(resp["error"]["code"], json!(INVALID_PARAMS));

    let resp = router
        .handle_value(json!({"jsonrpc": "1.0", "id": 5, "method": "tools/list"}))
        .await;
    assert_eq!(resp["error"]["code"], json!(INVALID_REQUEST));

    let resp = router
        .handle_value(json!({"jsonrpc": "2.0", "id": 6, "method": "resources/list"}))
        .await;
    assert_eq!(resp["error"]["code"], json!(METHOD_NOT_FOUND));

    let resp = router.handle_str("{not json").await;
    assert_eq!(resp["error"]["code"], json!(PARSE_ERROR));
    assert_eq!(resp["id"], Value::Null);
}

#[tokio::test]
async fn router_describes() {
    let router = RpcRouter::new(role_endpoint(WorkerRole::Scout));
    let resp = router
        .handle_value(json!({
            "jsonrpc": "2.0", "id": 1, "method": "tools/describe",
            "params": {"name": "detect_threats"}
        }))
        .await;
    assert_eq!(resp["result"]["name"], json!("detect_threats"));

    let resp = router
        .handle_value(json!({
            "jsonrpc": "2.0", "id": 2, "method": "tools/describe",
            "params": {"name": "decide"}
        }))
        .await;
    assert_eq!(resp["error"]["code"], json!(METHOD_NOT_FOUND));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Local client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn local_call_succeeds() {
    let client = LocalClient::new(role_endpoint(WorkerRole::Strategist));
    assert_eq!(client.identity().transport, TransportKind::Local);
    let resp = client.call("decide", decide_args(), DEADLINE).await;
    let decision: Decision = serde_json::from_value(resp.into_result().unwrap()).unwrap();
    assert_eq!(decision.position, Position::new(0, 2));
}

#[tokio::test]
async fn local_unknown_capability() {
    let client = LocalClient::new(role_endpoint(WorkerRole::Strategist));
    let resp = client.call("act", Arguments::new(), DEADLINE).await;
    assert_eq!(resp.error_kind(), Some(ErrorKind::CapabilityNotFound));
    assert_eq!(
        client.describe("act", DEADLINE).await.unwrap_err().kind,
        ErrorKind::CapabilityNotFound
    );
}

#[tokio::test]
async fn local_timeout_cancels_token_but_not_task() {
    let cancelled = Arc::new(AtomicBool::new(false));
    let endpoint = slow_endpoint(Arc::clone(&cancelled));
    let client = LocalClient::new(Arc::clone(&endpoint));

    let start = Instant::now();
    let resp = client
        .call("slow", Arguments::new(), DurationMs::from_millis(50))
        .await;
    assert_eq!(resp.error_kind(), Some(ErrorKind::Timeout));
    assert!(start.elapsed() < Duration::from_millis(400));

    // The handler keeps running and observes the token.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(cancelled.load(Ordering::SeqCst));
    assert_eq!(endpoint.stats().request_count, 1);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Remote client over HTTP
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn remote_round_trip_matches_local() {
    let endpoint = role_endpoint(WorkerRole::Strategist);
    let server = WorkerServer::bind("127.0.0.1:0", Arc::clone(&endpoint))
        .await
        .unwrap();
    let remote = RemoteClient::new(WorkerRole::Strategist, server.url());
    let local = LocalClient::new(endpoint);
    assert_eq!(remote.identity().transport, TransportKind::Remote);

    let r = remote.call("decide", decide_args(), DEADLINE).await;
    let l = local.call("decide", decide_args(), DEADLINE).await;
    let (r, l) = (r.into_result().unwrap(), l.into_result().unwrap());
    assert_eq!(r["position"], l["position"]);
    assert_eq!(r["rationale"], l["rationale"]);

    let r = remote.call("analyze", Arguments::new(), DEADLINE).await;
    let l = local.call("analyze", Arguments::new(), DEADLINE).await;
    assert_eq!(r.error_kind(), Some(ErrorKind::CapabilityNotFound));
    assert_eq!(r.error_kind(), l.error_kind());

    let r = remote
        .call("decide", args(json!({"observation": 1})), DEADLINE)
        .await;
    assert_eq!(r.error_kind(), Some(ErrorKind::InvalidArguments));

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn remote_discovery() {
    let server = WorkerServer::bind("127.0.0.1:0", role_endpoint(WorkerRole::Scout))
        .await
        .unwrap();
    let client = RemoteClient::new(WorkerRole::Scout, server.url());

    let first = client.list_capabilities(DEADLINE).await.unwrap();
    let second = client.list_capabilities(DEADLINE).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);

    let d = client.describe("identify_opportunities", DEADLINE).await.unwrap();
    assert_eq!(d.name, "identify_opportunities");
    assert_eq!(
        client.describe("act", DEADLINE).await.unwrap_err().kind,
        ErrorKind::CapabilityNotFound
    );

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn remote_timeout() {
    let cancelled = Arc::new(AtomicBool::new(false));
    let server = WorkerServer::bind("127.0.0.1:0", slow_endpoint(cancelled))
        .await
        .unwrap();
    let client = RemoteClient::new(WorkerRole::Strategist, server.url());

    let start = Instant::now();
    let resp = client
        .call("slow", Arguments::new(), DurationMs::from_millis(50))
        .await;
    assert_eq!(resp.error_kind(), Some(ErrorKind::Timeout));
    assert!(start.elapsed() < Duration::from_millis(400));
}

#[tokio::test]
async fn remote_unreachable_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = RemoteClient::new(WorkerRole::Scout, format!("http://{addr}/mcp"));
    let resp = client.call("analyze", Arguments::new(), DEADLINE).await;
    assert_eq!(resp.error_kind(), Some(ErrorKind::TransportError));
    assert_eq!(
        client.list_capabilities(DEADLINE).await.unwrap_err().kind,
        ErrorKind::TransportError
    );
}

/// A peer on `/mcp` that always answers with `reply`, whatever it was asked.
async fn canned_peer(reply: Value) -> String {
    let app = axum::Router::new().route(
        "/mcp",
        axum::routing::post(move || {
            let reply = reply.clone();
            async move { axum::Json(reply) }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/mcp")
}

#[tokio::test]
async fn remote_rejects_reply_for_another_request() {
    let url = canned_peer(json!({"jsonrpc": "2.0", "id": 999, "result": {"ok": true}})).await;
    let client = RemoteClient::new(WorkerRole::Scout, url);

    let resp = client.call("analyze", Arguments::new(), DEADLINE).await;
    assert_eq!(resp.error_kind(), Some(ErrorKind::TransportError));
    let err = resp.into_result().unwrap_err();
    assert!(err.message.contains("999"), "{}", err.message);

    assert_eq!(
        client.list_capabilities(DEADLINE).await.unwrap_err().kind,
        ErrorKind::TransportError
    );
}

#[tokio::test]
async fn remote_rejects_reply_without_id() {
    let url = canned_peer(json!({"jsonrpc": "2.0", "id": null, "result": {"ok": true}})).await;
    let client = RemoteClient::new(WorkerRole::Scout, url);
    let resp = client.call("analyze", Arguments::new(), DEADLINE).await;
    assert_eq!(resp.error_kind(), Some(ErrorKind::TransportError));
}

#[tokio::test]
async fn health_and_info_routes() {
    let endpoint = role_endpoint(WorkerRole::Executor);
    let server = WorkerServer::bind("127.0.0.1:0", Arc::clone(&endpoint))
        .await
        .unwrap();
    let client = RemoteClient::new(WorkerRole::Executor, server.url());
    let board = json!({"board": [["", "", ""], ["", "", ""], ["", "", ""]]});
    assert!(client.call("act", args(board), DEADLINE).await.is_success());

    let http = reqwest::Client::new();
    let health: Value = http
        .get(format!("http://{}/health", server.local_addr()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], json!("ok"));
    assert_eq!(health["role"], json!("executor"));
    assert_eq!(health["capability_count"], json!(1));
    assert_eq!(health["stats"]["request_count"], json!(1));

    let info: Value = http.get(server.url()).send().await.unwrap().json().await.unwrap();
    assert_eq!(info["name"], json!("trio-executor"));
    assert_eq!(info["tools"][0]["name"], json!("act"));

    server.shutdown().await.unwrap();
}
