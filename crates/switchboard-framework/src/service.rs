//! Tower integration for capability calls.
//!
//! [`CapabilityService`] adapts a [`Capability`] to `tower::Service<String>`,
//! so cross-cutting concerns are ordinary tower layers. [`invoke`] stacks a
//! [`TimeoutLayer`](tower::timeout::TimeoutLayer) on top and catches panics,
//! turning every failure into an [`InvokeError`].

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use switchboard_core::{BoxedCapability, CapabilityError};
use tower::timeout::error::Elapsed;
use tower::{BoxError, Service, ServiceBuilder, ServiceExt};
use tracing::trace;

use crate::error::{InvokeError, InvokeResult};

/// A tower [`Service`] that forwards its request to a capability.
#[derive(Clone)]
pub struct CapabilityService {
    capability: BoxedCapability,
}

impl CapabilityService {
    /// Wraps `capability`.
    pub fn new(capability: BoxedCapability) -> Self {
        Self { capability }
    }
}

impl Service<String> for CapabilityService {
    type Response = String;
    type Error = CapabilityError;
    type Future = BoxFuture<'static, Result<String, CapabilityError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, input: String) -> Self::Future {
        let capability = Arc::clone(&self.capability);
        async move {
            trace!(capability = capability.name(), "Calling capability");
            capability.handle(&input).await
        }
        .boxed()
    }
}

/// Calls `capability` with `input`, bounded by `timeout`.
///
/// Panics raised while the call is polled are caught and reported as
/// [`InvokeError::Panicked`].
pub async fn invoke(
    capability: &BoxedCapability,
    input: &str,
    timeout: Duration,
) -> InvokeResult<String> {
    let service = ServiceBuilder::new()
        .timeout(timeout)
        .service(CapabilityService::new(Arc::clone(capability)));

    let call = service.oneshot(input.to_string());
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(reply)) => Ok(reply),
        Ok(Err(err)) => Err(classify(err, timeout)),
        Err(payload) => Err(InvokeError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn classify(err: BoxError, timeout: Duration) -> InvokeError {
    if err.is::<Elapsed>() {
        return InvokeError::TimedOut(timeout);
    }
    match err.downcast::<CapabilityError>() {
        Ok(err) => InvokeError::Capability(*err),
        Err(other) => InvokeError::Internal(other.to_string()),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
