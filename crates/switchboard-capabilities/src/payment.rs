//! Payment recording.
//!
//! No money moves here: a payment is an `amount user` pair appended to the
//! ledger. The amount is kept verbatim so the reply echoes what the user typed.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use switchboard_core::{Capability, CapabilityError, CapabilityResult};
use time::OffsetDateTime;
use tracing::debug;

use crate::journal::Journal;

const USAGE: &str = "введите сумму и имя пользователя через пробел, например: 100 alice";

/// One recorded payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Amount as entered.
    pub amount: String,
    /// Paying user.
    pub user: String,
    /// Recording time.
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

impl PaymentRecord {
    /// Numeric value of the amount, accepting a decimal comma.
    pub fn numeric_amount(&self) -> Option<f64> {
        self.amount.replace(',', ".").parse::<f64>().ok()
    }
}

/// Payment ledger.
#[derive(Debug, Default)]
pub struct PaymentProcessor {
    ledger: RwLock<Vec<PaymentRecord>>,
    journal: Option<Journal>,
}

impl PaymentProcessor {
    /// Creates a memory-only ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger backed by `journal`, preloading its records.
    pub async fn load(journal: Journal) -> CapabilityResult<Self> {
        let ledger = journal.read_all::<PaymentRecord>().await?;
        debug!(count = ledger.len(), path = %journal.path().display(), "Loaded payments");
        Ok(Self {
            ledger: RwLock::new(ledger),
            journal: Some(journal),
        })
    }

    /// Number of recorded payments.
    pub fn count(&self) -> usize {
        self.ledger.read().len()
    }

    /// Sum of all amounts that parse as numbers.
    pub fn total(&self) -> f64 {
        self.ledger
            .read()
            .iter()
            .filter_map(PaymentRecord::numeric_amount)
            .sum()
    }

    fn parse(input: &str) -> CapabilityResult<(&str, &str)> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        match tokens.as_slice() {
            [amount, user] => Ok((amount, user)),
            _ => Err(CapabilityError::validation(USAGE)),
        }
    }
}

#[async_trait]
impl Capability for PaymentProcessor {
    fn name(&self) -> &'static str {
        "payment"
    }

    async fn handle(&self, input: &str) -> CapabilityResult<String> {
        let (amount, user) = Self::parse(input)?;

        let record = PaymentRecord {
            amount: amount.to_string(),
            user: user.to_string(),
            recorded_at: OffsetDateTime::now_utc(),
        };
        if let Some(journal) = &self.journal {
            journal.append(&record).await?;
        }
        self.ledger.write().push(record);

        Ok(format!(
            "Платеж на сумму {amount} от пользователя {user} обработан."
        ))
    }
}
