//! Activity summary across the recording capabilities.

use std::sync::Arc;

use async_trait::async_trait;
use switchboard_core::{Capability, CapabilityResult};

use crate::events::EventLog;
use crate::feedback::FeedbackBox;
use crate::notify::Notifier;
use crate::payment::PaymentProcessor;

/// Summarizes what the other capabilities have recorded.
///
/// Input is ignored.
#[derive(Debug)]
pub struct Reporter {
    events: Arc<EventLog>,
    payments: Arc<PaymentProcessor>,
    feedback: Arc<FeedbackBox>,
    notifications: Arc<Notifier>,
}

impl Reporter {
    /// Creates a reporter over shared handles to the recorders.
    pub fn new(
        events: Arc<EventLog>,
        payments: Arc<PaymentProcessor>,
        feedback: Arc<FeedbackBox>,
        notifications: Arc<Notifier>,
    ) -> Self {
        Self {
            events,
            payments,
            feedback,
            notifications,
        }
    }
}

#[async_trait]
impl Capability for Reporter {
    fn name(&self) -> &'static str {
        "report"
    }

    async fn handle(&self, _input: &str) -> CapabilityResult<String> {
        Ok(format!(
            "Отчёт:\n• событий: {}\n• платежей: {} на сумму {:.2}\n• отзывов: {}\n• уведомлений в очереди: {}",
            self.events.count(),
            self.payments.count(),
            self.payments.total(),
            self.feedback.count(),
            self.notifications.pending(),
        ))
    }
}
