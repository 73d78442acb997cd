//! Feedback collection.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use switchboard_core::{Capability, CapabilityError, CapabilityResult};
use time::OffsetDateTime;

use crate::journal::Journal;

/// One feedback entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// What the user wrote.
    pub text: String,
    /// Reception time.
    #[serde(with = "time::serde::rfc3339")]
    pub received_at: OffsetDateTime,
}

/// Appends feedback to a journal shared by every chat.
#[derive(Debug)]
pub struct FeedbackBox {
    journal: Journal,
    received: AtomicUsize,
}

impl FeedbackBox {
    /// Opens the box over `journal`, counting the entries already present.
    pub async fn load(journal: Journal) -> CapabilityResult<Self> {
        let existing = journal.read_all::<FeedbackRecord>().await?.len();
        Ok(Self {
            journal,
            received: AtomicUsize::new(existing),
        })
    }

    /// Number of entries received.
    pub fn count(&self) -> usize {
        self.received.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Capability for FeedbackBox {
    fn name(&self) -> &'static str {
        "feedback"
    }

    async fn handle(&self, input: &str) -> CapabilityResult<String> {
        let text = input.trim();
        if text.is_empty() {
            return Err(CapabilityError::validation("напишите текст отзыва после команды"));
        }

        self.journal
            .append(&FeedbackRecord {
                text: text.to_string(),
                received_at: OffsetDateTime::now_utc(),
            })
            .await?;
        self.received.fetch_add(1, Ordering::Relaxed);

        Ok("Спасибо за отзыв!".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_feedback_all_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.jsonl");
        let inbox = Arc::new(FeedbackBox::load(Journal::new(&path)).await.unwrap());

        let tasks: Vec<_> = (0..40)
            .map(|i| {
                let inbox = Arc::clone(&inbox);
                tokio::spawn(async move { inbox.handle(&format!("отзыв {i}")).await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), "Спасибо за отзыв!");
        }

        assert_eq!(inbox.count(), 40);
        let records: Vec<FeedbackRecord> = Journal::new(&path).read_all().await.unwrap();
        assert_eq!(records.len(), 40);
    }

    #[tokio::test]
    async fn test_empty_feedback_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let inbox = FeedbackBox::load(Journal::new(dir.path().join("f.jsonl")))
            .await
            .unwrap();
        assert!(matches!(
            inbox.handle(" ").await,
            Err(CapabilityError::Validation(_))
        ));
        assert_eq!(inbox.count(), 0);
    }

    #[tokio::test]
    async fn test_unwritable_journal_is_io() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be.
        let path = dir.path().join("taken");
        std::fs::create_dir(&path).unwrap();
        let inbox = FeedbackBox {
            journal: Journal::new(&path),
            received: AtomicUsize::new(0),
        };
        assert!(matches!(
            inbox.handle("hello").await,
            Err(CapabilityError::Io(_))
        ));
    }
}
