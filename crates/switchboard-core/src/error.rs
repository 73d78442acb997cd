//! Error types shared across Switchboard layers.

use thiserror::Error;

// =============================================================================
// Capability Errors
// =============================================================================

/// Coarse classification of a capability failure.
///
/// The dispatcher picks the user-facing reply by kind; the detail only goes to
/// the logs (except for validation, where it is the corrective hint).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad user input.
    Validation,
    /// An upstream dependency was unavailable or answered with garbage status.
    Transport,
    /// A local resource (file, directory) could not be used.
    Io,
}

/// Errors returned by [`Capability::handle`](crate::Capability::handle).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    /// The input could not be parsed. The message is shown to the user.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The upstream service failed.
    #[error("upstream failure: {0}")]
    Transport(String),

    /// Local I/O failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl CapabilityError {
    /// Creates a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates an I/O error.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Returns the detail message without the kind prefix.
    pub fn detail(&self) -> &str {
        match self {
            Self::Validation(d) | Self::Transport(d) | Self::Io(d) => d,
        }
    }
}

impl From<std::io::Error> for CapabilityError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// Routing Errors
// =============================================================================

/// An event could not be mapped to a capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// No capability is registered under this command name.
    #[error("unknown command '/{0}'")]
    UnknownCommand(String),

    /// Wire data did not name a known intent.
    #[error("unknown intent '{0}'")]
    UnknownIntent(String),

    /// The intent exists but nothing was registered for it.
    #[error("no capability bound to intent '{0}'")]
    UnboundIntent(crate::Intent),
}

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors raised at the transport boundary.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The request never completed.
    #[error("request failed: {0}")]
    Request(String),

    /// The remote API rejected the call.
    #[error("API error {status}: {description}")]
    Api {
        /// HTTP or API status code.
        status: u16,
        /// Description returned by the API.
        description: String,
    },

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Result type for capability calls.
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
