//! The capability contract.
//!
//! Every domain service the dispatcher can route to (weather, analysis,
//! payments, ...) implements [`Capability`]. The dispatcher never looks inside
//! the input: parsing, validation and I/O all happen behind `handle`.
//!
//! ```rust,ignore
//! struct Echo;
//!
//! #[async_trait]
//! impl Capability for Echo {
//!     fn name(&self) -> &'static str {
//!         "echo"
//!     }
//!
//!     async fn handle(&self, input: &str) -> CapabilityResult<String> {
//!         Ok(input.to_string())
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CapabilityResult;

/// A domain service reachable through the dispatcher.
#[async_trait]
pub trait Capability: Send + Sync + 'static {
    /// Stable name used in logs and the registry.
    fn name(&self) -> &'static str;

    /// Handles raw user input and returns the reply text.
    async fn handle(&self, input: &str) -> CapabilityResult<String>;
}

/// Shared, type-erased capability.
pub type BoxedCapability = Arc<dyn Capability>;
