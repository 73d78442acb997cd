//! Switchboard Runtime - process-level wiring for the Switchboard bot.
//!
//! This crate provides:
//! - Layered configuration (`ConfigLoader`, `SwitchboardConfig`)
//! - Logging setup (`LoggingBuilder`)
//! - The capability catalog (`build_registry`)
//! - Per-chat lanes that keep each chat's events in order (`ChatLanes`)
//! - The polling loop with backoff and graceful shutdown (`SwitchboardRuntime`)
//!
//! ```ignore
//! use switchboard_runtime::SwitchboardRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = SwitchboardRuntime::builder()
//!         .profile("production")
//!         .build()
//!         .await?;
//!
//!     // Run until Ctrl+C or SIGTERM
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod lanes;
pub mod logging;
pub mod runtime;

// Re-exports
pub use catalog::{COMMANDS, build_registry};
pub use config::{ConfigError, ConfigLoader, ConfigResult, Profile, SwitchboardConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use lanes::ChatLanes;
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{RuntimeBuilder, SwitchboardRuntime};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
