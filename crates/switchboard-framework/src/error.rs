//! Error types for capability invocation.

use std::time::Duration;

use switchboard_core::CapabilityError;
use thiserror::Error;

/// Why a capability call did not produce a reply.
#[derive(Debug, Clone, Error)]
pub enum InvokeError {
    /// The capability returned an error.
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    /// The call exceeded the configured timeout.
    #[error("capability call timed out after {0:?}")]
    TimedOut(Duration),

    /// The capability panicked.
    #[error("capability panicked: {0}")]
    Panicked(String),

    /// The service stack failed for a reason the capability did not report.
    #[error("service error: {0}")]
    Internal(String),
}

/// Result type for capability invocation.
pub type InvokeResult<T> = Result<T, InvokeError>;
