//! # Switchboard
//!
//! A session-scoped conversation dispatcher for Telegram bots.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐    ┌───────────┐    ┌────────────────────────┐    ┌──────────────┐
//! │ Telegram  │───▶│ ChatLanes │───▶│ ConversationDispatcher │───▶│ Capabilities │
//! │ (poller)  │    │ (per chat)│    │  sessions · menu       │    │ weather, ... │
//! └───────────┘    └───────────┘    └────────────────────────┘    └──────────────┘
//!       ▲                                      │
//!       └────────────── Reply ─────────────────┘
//! ```
//!
//! - **Transport**: long-polls updates and sends replies with inline menus
//! - **Lanes**: one task per active chat, so a chat's events stay ordered
//! - **Dispatcher**: `/start` shows the menu, a menu selection arms the
//!   session, the next free text goes to the selected capability
//! - **Capabilities**: weather, events, analysis, payments, images, and the
//!   command-only extras (`/notify`, `/report`, `/feedback`, `/ship`, `/track`)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use switchboard::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = SwitchboardRuntime::builder().build().await?;
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: read `switchboard.toml` files (default)
//! - `json-log`: JSON log output

pub use switchboard_capabilities as capabilities;
pub use switchboard_core as core;
pub use switchboard_framework as framework;
pub use switchboard_runtime as runtime;
pub use switchboard_transport as transport;

/// Commonly used types.
///
/// ```rust,ignore
/// use switchboard::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use switchboard_runtime::{SwitchboardConfig, SwitchboardRuntime};

    // Dispatching
    pub use switchboard_framework::{
        CapabilityRegistry, CommandSpec, ConversationDispatcher, IntentMenu, SessionStore,
    };

    // Core types for custom capabilities and transports
    pub use switchboard_core::{
        BoxedCapability, Capability, CapabilityError, CapabilityResult, ChatId, EventSource,
        InboundEvent, Intent, Reply, ReplySink,
    };
}
