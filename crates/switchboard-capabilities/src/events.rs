//! Event registration.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use switchboard_core::{Capability, CapabilityError, CapabilityResult};
use time::OffsetDateTime;
use tracing::debug;

use crate::journal::Journal;

/// One registered event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Free-form title as typed by the user.
    pub title: String,
    /// Registration time.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Keeps registered events in memory and, optionally, in a journal.
#[derive(Debug, Default)]
pub struct EventLog {
    events: RwLock<Vec<EventRecord>>,
    journal: Option<Journal>,
}

impl EventLog {
    /// Creates a memory-only log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a log backed by `journal`, preloading the records it holds.
    pub async fn load(journal: Journal) -> CapabilityResult<Self> {
        let events = journal.read_all::<EventRecord>().await?;
        debug!(count = events.len(), path = %journal.path().display(), "Loaded events");
        Ok(Self {
            events: RwLock::new(events),
            journal: Some(journal),
        })
    }

    /// Number of registered events.
    pub fn count(&self) -> usize {
        self.events.read().len()
    }

    /// Snapshot of all events in registration order.
    pub fn events(&self) -> Vec<EventRecord> {
        self.events.read().clone()
    }
}

#[async_trait]
impl Capability for EventLog {
    fn name(&self) -> &'static str {
        "events"
    }

    async fn handle(&self, input: &str) -> CapabilityResult<String> {
        let title = input.trim();
        if title.is_empty() {
            return Err(CapabilityError::validation("укажите название события"));
        }

        let record = EventRecord {
            title: title.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        if let Some(journal) = &self.journal {
            journal.append(&record).await?;
        }
        self.events.write().push(record);

        Ok(format!("Событие '{title}' добавлено."))
    }
}
