//! The transport boundary.
//!
//! A transport feeds classified [`InboundEvent`]s into the runtime and sends
//! [`Reply`]s back. Both directions are fallible, but neither failure is ever
//! allowed to stop the dispatch loop: the runtime logs and carries on.

use std::sync::Arc;

use async_trait::async_trait;

use crate::chat::ChatId;
use crate::error::TransportResult;
use crate::event::{InboundEvent, Reply};

/// Produces batches of inbound events, e.g. by long polling.
#[async_trait]
pub trait EventSource: Send {
    /// Waits for the next batch. An empty batch is a normal poll timeout.
    async fn next_batch(&mut self) -> TransportResult<Vec<InboundEvent>>;
}

/// Delivers replies to chats.
#[async_trait]
pub trait ReplySink: Send + Sync + 'static {
    /// Sends `reply` to `chat_id`.
    async fn send(&self, chat_id: ChatId, reply: &Reply) -> TransportResult<()>;
}

/// Shared, type-erased reply sink.
pub type BoxedReplySink = Arc<dyn ReplySink>;
