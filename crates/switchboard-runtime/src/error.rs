//! Runtime error types.

use switchboard_core::{CapabilityError, TransportError};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that stop the runtime from starting.
///
/// Once running, failures are logged and never surface here.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A capability could not be set up.
    #[error("Failed to initialize capability: {0}")]
    Capability(#[from] CapabilityError),

    /// The transport could not be set up.
    #[error("Failed to initialize transport: {0}")]
    Transport(#[from] TransportError),

    /// Signal handlers could not be installed.
    #[error("Failed to install signal handler: {0}")]
    Signal(#[from] std::io::Error),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
