use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use trio_capability::*;
use trio_protocol::{Arguments, DurationMs, ErrorKind, InvocationError, RequestId};

#[derive(Debug, Deserialize, JsonSchema)]
struct CountArgs {
    items: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CountOutput {
    count: usize,
}

#[derive(Debug, thiserror::Error)]
#[error("too many items: {0}")]
struct TooMany(usize);

struct Count;

impl Capability for Count {
    const NAME: &'static str = "count";
    type Args = CountArgs;
    type Output = CountOutput;
    type Error = TooMany;

    fn description(&self) -> &str {
        "Count the items"
    }

    async fn call(&self, args: CountArgs, _ctx: &CapabilityContext) -> Result<CountOutput, TooMany> {
        if args.items.len() > 3 {
            return Err(TooMany(args.items.len()));
        }
        Ok(CountOutput {
            count: args.items.len(),
        })
    }
}

fn args(value: serde_json::Value) -> Arguments {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("arguments must be an object"),
    }
}

fn ctx() -> CapabilityContext {
    CapabilityContext::new(RequestId::new(1), DurationMs::from_millis(100))
}

#[tokio::test]
async fn register_and_call_typed_capability() {
    let mut registry = CapabilityRegistry::new();
    registry.register(Count).unwrap();

    let cap = registry.get("count").unwrap();
    let ctx = ctx();
    let out = cap
        .call_dyn(args(json!({"items": ["a", "b"]})), &ctx)
        .await
        .unwrap();
    assert_eq!(out, json!({"count": 2}));
}

#[test]
fn duplicate_registration_fails() {
    let mut registry = CapabilityRegistry::new();
    registry.register(Count).unwrap();
    assert_eq!(
        registry.register(Count),
        Err(RegistryError::DuplicateCapability("count".into()))
    );
    assert_eq!(registry.len(), 1);
}

#[test]
fn get_missing_fails_with_not_found() {
    let registry = CapabilityRegistry::new();
    let err = registry.get("nope").err().unwrap();
    assert_eq!(err, RegistryError::CapabilityNotFound("nope".into()));
    let wire: InvocationError = err.into();
    assert_eq!(wire.kind, ErrorKind::CapabilityNotFound);
}

#[tokio::test]
async fn bad_arguments_are_invalid_arguments() {
    let registry = CapabilityRegistry::new().with(Count).unwrap();
    let cap = registry.get("count").unwrap();
    let ctx = ctx();
    let err = cap
        .call_dyn(args(json!({"items": 7})), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, CapabilityError::InvalidArguments(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidArguments);
}

#[tokio::test]
async fn handler_error_maps_to_handler_error() {
    let registry = CapabilityRegistry::new().with(Count).unwrap();
    let cap = registry.get("count").unwrap();
    let ctx = ctx();
    let err = cap
        .call_dyn(args(json!({"items": ["a", "b", "c", "d"]})), &ctx)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HandlerError);
    assert!(err.to_string().contains("too many items: 4"));
}

#[tokio::test]
async fn cancelled_context_short_circuits() {
    let registry = CapabilityRegistry::new().with(Count).unwrap();
    let cap = registry.get("count").unwrap();
    let ctx = ctx();
    ctx.cancellation_token.cancel();
    let err = cap
        .call_dyn(args(json!({"items": []})), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, CapabilityError::Cancelled));
}

#[test]
fn descriptor_carries_generated_schema() {
    let registry = CapabilityRegistry::new().with(Count).unwrap();
    let d = registry.list().next().unwrap();
    assert_eq!(d.name, "count");
    assert_eq!(d.description, "Count the items");
    assert!(d.input_schema["properties"]["items"].is_object());
}

#[test]
fn list_is_sorted_and_restartable() {
    let mut registry = CapabilityRegistry::new();
    registry
        .register_fn("zeta", "last", json!({"type": "object"}), |_, _| async {
            Ok(json!(null))
        })
        .unwrap();
    registry.register(Count).unwrap();
    registry
        .register_fn("alpha", "first", json!({"type": "object"}), |_, _| async {
            Ok(json!(null))
        })
        .unwrap();

    let first: Vec<String> = registry.list().map(|d| d.name).collect();
    let second: Vec<String> = registry.list().map(|d| d.name).collect();
    assert_eq!(first, vec!["alpha", "count", "zeta"]);
    assert_eq!(first, second);
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["alpha", "count", "zeta"]);
}

#[tokio::test]
async fn fn_capability_sees_arguments_and_context() {
    let mut registry = CapabilityRegistry::new();
    registry
        .register_fn(
            "echo",
            "Echo arguments",
            json!({"type": "object"}),
            |args, ctx| async move {
                Ok(json!({"args": args, "request_id": ctx.request_id.get()}))
            },
        )
        .unwrap();
    let cap = registry.get("echo").unwrap();
    let ctx = ctx();
    let out = cap.call_dyn(args(json!({"x": 1})), &ctx).await.unwrap();
    assert_eq!(out, json!({"args": {"x": 1}, "request_id": 1}));
}
