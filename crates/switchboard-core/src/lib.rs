//! # Switchboard Core
//!
//! Foundation types shared by every Switchboard layer.
//!
//! - [`ChatId`], [`Session`] and [`SessionMutation`]: per-chat conversation state
//! - [`Intent`]: the closed set of follow-up inputs a chat can be waiting for
//! - [`InboundEvent`], [`Reply`] and [`DispatchResult`]: what flows in and out
//!   of the dispatcher
//! - [`Capability`]: the uniform contract every domain service implements
//! - [`EventSource`] and [`ReplySink`]: the transport boundary
//!
//! Nothing in this crate performs I/O. Higher layers (framework, runtime,
//! transport) build on these types.

pub mod capability;
pub mod chat;
pub mod error;
pub mod event;
pub mod intent;
pub mod transport;

pub use capability::{BoxedCapability, Capability};
pub use chat::{ChatId, Session, SessionMutation};
pub use error::{
    CapabilityError, CapabilityResult, ErrorKind, RoutingError, TransportError, TransportResult,
};
pub use event::{DispatchResult, InboundEvent, MenuOption, Reply};
pub use intent::Intent;
pub use transport::{BoxedReplySink, EventSource, ReplySink};
