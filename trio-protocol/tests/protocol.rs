//! Protocol-level tests: object safety and wire shapes.

use serde_json::json;
use std::sync::Arc;
use trio_protocol::*;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Object Safety: Arc<dyn Trait> compiles and is Send + Sync
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn _assert_send_sync<T: Send + Sync>() {}

#[test]
fn arc_worker_client_is_send_sync() {
    _assert_send_sync::<Arc<dyn WorkerClient>>();
}

#[test]
fn arc_telemetry_sink_is_send_sync() {
    _assert_send_sync::<Arc<dyn TelemetrySink>>();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire shapes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn error_kinds_serialize_snake_case() {
    let kinds = [
        (ErrorKind::CapabilityNotFound, "capability_not_found"),
        (ErrorKind::InvalidArguments, "invalid_arguments"),
        (ErrorKind::HandlerError, "handler_error"),
        (ErrorKind::TransportError, "transport_error"),
        (ErrorKind::Timeout, "timeout"),
        (ErrorKind::IllegalAction, "illegal_action"),
        (ErrorKind::NoLegalMove, "no_legal_move"),
    ];
    for (kind, name) in kinds {
        assert_eq!(serde_json::to_value(kind).unwrap(), json!(name));
        assert_eq!(kind.as_str(), name);
        assert_eq!(kind.to_string(), name);
    }
}

#[test]
fn response_is_tagged_by_status() {
    let ok = InvocationResponse::success(json!({"row": 1}));
    assert_eq!(
        serde_json::to_value(&ok).unwrap(),
        json!({"status": "success", "result": {"row": 1}})
    );

    let failed = InvocationResponse::failure(ErrorKind::Timeout, "too slow");
    assert_eq!(
        serde_json::to_value(&failed).unwrap(),
        json!({"status": "failure", "error_kind": "timeout", "message": "too slow"})
    );
}

#[test]
fn response_into_result_keeps_kind() {
    let err = InvocationResponse::failure(ErrorKind::HandlerError, "boom")
        .into_result()
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::HandlerError);
    assert_eq!(err.to_string(), "handler_error: boom");

    let value = InvocationResponse::success(json!(3)).into_result().unwrap();
    assert_eq!(value, json!(3));
}

#[test]
fn request_arguments_default_to_empty() {
    let req: InvocationRequest = serde_json::from_value(json!({
        "capability_name": "analyze",
        "request_id": 7,
        "deadline": 8000
    }))
    .unwrap();
    assert!(req.arguments.is_empty());
    assert_eq!(req.request_id, RequestId::new(7));
    assert_eq!(req.deadline, DurationMs::from_secs(8));
}

#[test]
fn descriptor_uses_input_schema_wire_name() {
    let d = CapabilityDescriptor::new("act", "Execute a move", json!({"type": "object"}));
    let v = serde_json::to_value(&d).unwrap();
    assert_eq!(v["inputSchema"], json!({"type": "object"}));
    assert!(v.get("input_schema").is_none());
}

#[test]
fn request_ids_are_monotonic_from_one() {
    let ids = RequestIdGen::new();
    assert_eq!(ids.next_id().get(), 1);
    assert_eq!(ids.next_id().get(), 2);
    assert_eq!(ids.next_id().get(), 3);
}

#[test]
fn stage_capabilities_map_to_roles() {
    assert_eq!(StageCapability::Analyze.role(), WorkerRole::Scout);
    assert_eq!(StageCapability::Decide.role(), WorkerRole::Strategist);
    assert_eq!(StageCapability::Act.role(), WorkerRole::Executor);
    assert_eq!(Stage::Validate.role(), None);
    assert_eq!(Stage::Observe.capability(), Some(StageCapability::Analyze));
}

#[test]
fn telemetry_event_is_tagged() {
    let event = TelemetryEvent::Stage {
        stage: Stage::Decide,
        role: Some(WorkerRole::Strategist),
        outcome: Outcome::Failure {
            kind: ErrorKind::Timeout,
        },
        duration: DurationMs::from_millis(8000),
        substitution: Some(Substitution::FallbackRanking),
    };
    let v = serde_json::to_value(&event).unwrap();
    assert_eq!(v["event"], "stage");
    assert_eq!(v["stage"], "decide");
    assert_eq!(v["outcome"]["outcome"], "failure");
    assert_eq!(v["outcome"]["kind"], "timeout");
    assert_eq!(v["substitution"], "fallback_ranking");
}

#[test]
fn identity_display() {
    let id = WorkerIdentity::new(
        WorkerRole::Scout,
        TransportKind::Remote,
        "http://localhost:3001/mcp",
    );
    assert_eq!(id.to_string(), "scout@remote(http://localhost:3001/mcp)");
}

#[test]
fn turn_error_kind() {
    let err = TurnError::NoLegalMove("board is full".into());
    assert_eq!(err.kind(), ErrorKind::NoLegalMove);
    assert_eq!(err.to_string(), "no legal move: board is full");
}
