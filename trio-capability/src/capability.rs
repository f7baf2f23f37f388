//! The typed [`Capability`] trait and its type-erased form.

use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use trio_protocol::{
    Arguments, BoxFuture, CapabilityDescriptor, DurationMs, ErrorKind, InvocationError, RequestId,
};

/// Per-invocation context handed to every handler.
#[derive(Debug, Clone, Default)]
pub struct CapabilityContext {
    /// Id of the request being served.
    pub request_id: RequestId,
    /// Deadline the caller attached to the request.
    pub deadline: DurationMs,
    /// Cancelled when the caller stops waiting. Handlers may observe it;
    /// nothing aborts them.
    pub cancellation_token: CancellationToken,
}

impl CapabilityContext {
    /// A context with a fresh cancellation token.
    pub fn new(request_id: RequestId, deadline: DurationMs) -> Self {
        Self {
            request_id,
            deadline,
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Replace the cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Whether the caller has stopped waiting.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}

/// Errors produced by a capability call, before the endpoint maps them
/// onto the wire taxonomy.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// Arguments did not decode into the capability's argument type.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    /// The handler ran and failed.
    #[error("handler failed: {0}")]
    Handler(String),
    /// The handler observed cancellation and gave up.
    #[error("cancelled")]
    Cancelled,
}

impl CapabilityError {
    /// The taxonomy kind this error is reported as.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArguments(_) => ErrorKind::InvalidArguments,
            Self::Handler(_) | Self::Cancelled => ErrorKind::HandlerError,
        }
    }
}

impl From<CapabilityError> for InvocationError {
    fn from(err: CapabilityError) -> Self {
        InvocationError::new(err.kind(), err.to_string())
    }
}

/// Strongly-typed capability. Implement this for worker handlers.
///
/// The blanket impl of [`CapabilityDyn`] decodes the name-keyed arguments
/// into [`Capability::Args`] and encodes the output, so handlers only ever
/// see concrete Rust types.
///
/// ```
/// use schemars::JsonSchema;
/// use serde::Deserialize;
/// use trio_capability::{Capability, CapabilityContext, CapabilityError};
///
/// #[derive(Deserialize, JsonSchema)]
/// struct EchoArgs { text: String }
///
/// struct Echo;
///
/// impl Capability for Echo {
///     const NAME: &'static str = "echo";
///     type Args = EchoArgs;
///     type Output = String;
///     type Error = CapabilityError;
///
///     fn description(&self) -> &str { "Echo the text back" }
///
///     async fn call(&self, args: EchoArgs, _ctx: &CapabilityContext) -> Result<String, CapabilityError> {
///         Ok(args.text)
///     }
/// }
/// ```
pub trait Capability: Send + Sync {
    /// Unique name within a worker.
    const NAME: &'static str;
    /// Decoded input.
    type Args: DeserializeOwned + JsonSchema + Send;
    /// Encodable output.
    type Output: Serialize + Send;
    /// Handler error.
    type Error: std::error::Error + Send + 'static;

    /// What the capability does.
    fn description(&self) -> &str;

    /// JSON Schema of [`Capability::Args`], generated by `schemars`.
    fn input_schema(&self) -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(Self::Args))
            .unwrap_or_else(|_| serde_json::json!({"type": "object"}))
    }

    /// Run the handler.
    fn call(
        &self,
        args: Self::Args,
        ctx: &CapabilityContext,
    ) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send;
}

/// Type-erased capability for name-keyed dispatch. Blanket-implemented for
/// every [`Capability`].
pub trait CapabilityDyn: Send + Sync {
    /// The capability's unique name.
    fn name(&self) -> &str;
    /// Discovery record: name, description, input schema.
    fn descriptor(&self) -> CapabilityDescriptor;
    /// Run the handler on name-keyed arguments.
    fn call_dyn<'a>(
        &'a self,
        args: Arguments,
        ctx: &'a CapabilityContext,
    ) -> BoxFuture<'a, Result<serde_json::Value, CapabilityError>>;
}

impl<T: Capability> CapabilityDyn for T {
    fn name(&self) -> &str {
        T::NAME
    }

    fn descriptor(&self) -> CapabilityDescriptor {
        CapabilityDescriptor::new(T::NAME, self.description(), self.input_schema())
    }

    fn call_dyn<'a>(
        &'a self,
        args: Arguments,
        ctx: &'a CapabilityContext,
    ) -> BoxFuture<'a, Result<serde_json::Value, CapabilityError>> {
        Box::pin(async move {
            if ctx.is_cancelled() {
                return Err(CapabilityError::Cancelled);
            }
            let args: T::Args = serde_json::from_value(serde_json::Value::Object(args))
                .map_err(|e| CapabilityError::InvalidArguments(e.to_string()))?;
            let output = self
                .call(args, ctx)
                .await
                .map_err(|e| CapabilityError::Handler(e.to_string()))?;
            serde_json::to_value(&output).map_err(|e| CapabilityError::Handler(e.to_string()))
        })
    }
}

type Handler =
    dyn Fn(Arguments, CapabilityContext) -> BoxFuture<'static, Result<serde_json::Value, CapabilityError>>
        + Send
        + Sync;

/// A capability built from a closure over untyped arguments.
///
/// For ad-hoc handlers and tests. Role handlers implement [`Capability`].
pub struct FnCapability {
    name: String,
    description: String,
    input_schema: serde_json::Value,
    handler: Arc<Handler>,
}

impl FnCapability {
    /// Wrap a closure. The schema is taken as given.
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
        handler: F,
    ) -> Self
    where
        F: Fn(Arguments, CapabilityContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, CapabilityError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            handler: Arc::new(
                move |args: Arguments,
                      ctx: CapabilityContext|
                      -> BoxFuture<'static, Result<serde_json::Value, CapabilityError>> {
                    Box::pin(handler(args, ctx))
                },
            ),
        }
    }
}

impl std::fmt::Debug for FnCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnCapability")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl CapabilityDyn for FnCapability {
    fn name(&self) -> &str {
        &self.name
    }

    fn descriptor(&self) -> CapabilityDescriptor {
        CapabilityDescriptor::new(
            self.name.clone(),
            self.description.clone(),
            self.input_schema.clone(),
        )
    }

    fn call_dyn<'a>(
        &'a self,
        args: Arguments,
        ctx: &'a CapabilityContext,
    ) -> BoxFuture<'a, Result<serde_json::Value, CapabilityError>> {
        (self.handler)(args, ctx.clone())
    }
}
