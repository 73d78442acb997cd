//! Notification queue.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use switchboard_core::{Capability, CapabilityError, CapabilityResult};
use time::OffsetDateTime;

use crate::journal::Journal;

/// A queued notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Message body.
    pub text: String,
    /// Enqueue time.
    #[serde(with = "time::serde::rfc3339")]
    pub queued_at: OffsetDateTime,
}

/// Queues notifications for later delivery.
#[derive(Debug, Default)]
pub struct Notifier {
    queue: Mutex<VecDeque<Notification>>,
    journal: Option<Journal>,
}

impl Notifier {
    /// Creates a memory-only queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a queue backed by `journal`, restoring what it holds.
    pub async fn load(journal: Journal) -> CapabilityResult<Self> {
        let queue: VecDeque<Notification> = journal.read_all().await?.into();
        Ok(Self {
            queue: Mutex::new(queue),
            journal: Some(journal),
        })
    }

    /// Number of queued notifications.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Removes and returns every queued notification, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        self.queue.lock().drain(..).collect()
    }
}

#[async_trait]
impl Capability for Notifier {
    fn name(&self) -> &'static str {
        "notification"
    }

    async fn handle(&self, input: &str) -> CapabilityResult<String> {
        let text = input.trim();
        if text.is_empty() {
            return Err(CapabilityError::validation("укажите текст уведомления"));
        }

        let notification = Notification {
            text: text.to_string(),
            queued_at: OffsetDateTime::now_utc(),
        };
        if let Some(journal) = &self.journal {
            journal.append(&notification).await?;
        }
        self.queue.lock().push_back(notification);

        Ok("Уведомление поставлено в очередь.".to_string())
    }
}
