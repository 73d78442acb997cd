//! # Switchboard Framework
//!
//! The session-scoped conversation dispatcher and the pieces it is built from:
//!
//! - [`SessionStore`]: one pending-intent slot per chat
//! - [`IntentMenu`]: the ordered menu and its prompts
//! - [`CapabilityRegistry`]: static intent and command tables
//! - [`CapabilityService`]: tower service wrapping a capability call
//! - [`ConversationDispatcher`]: the per-chat state machine
//!
//! The dispatcher itself does not serialize events. Callers must feed events
//! for one chat sequentially (the runtime does this with one lane per chat);
//! different chats may be dispatched concurrently.

pub mod dispatcher;
pub mod error;
pub mod menu;
pub mod registry;
pub mod service;
pub mod session;
pub mod text;

pub use dispatcher::{ConversationDispatcher, DEFAULT_CALL_TIMEOUT};
pub use error::{InvokeError, InvokeResult};
pub use menu::IntentMenu;
pub use registry::{CapabilityRegistry, CommandSpec, RegistryBuilder};
pub use service::{CapabilityService, invoke};
pub use session::SessionStore;
