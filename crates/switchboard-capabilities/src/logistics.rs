//! Shipment registration and tracking.
//!
//! [`ShipmentIntake`] and [`ShipmentTracker`] are two capabilities over one
//! shared [`ShipmentBook`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use switchboard_core::{Capability, CapabilityError, CapabilityResult};
use time::OffsetDateTime;
use time::macros::format_description;

/// A registered shipment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shipment {
    /// Caller-chosen identifier.
    pub id: String,
    /// Destination, possibly several words.
    pub destination: String,
    /// Registration time.
    pub registered_at: OffsetDateTime,
}

/// In-memory shipment index.
#[derive(Debug, Default)]
pub struct ShipmentBook {
    shipments: RwLock<HashMap<String, Shipment>>,
}

impl ShipmentBook {
    /// Creates an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a shipment. Fails if `id` is already taken.
    pub fn register(&self, id: &str, destination: &str) -> CapabilityResult<Shipment> {
        let mut shipments = self.shipments.write();
        if shipments.contains_key(id) {
            return Err(CapabilityError::validation(format!(
                "отправление {id} уже зарегистрировано"
            )));
        }
        let shipment = Shipment {
            id: id.to_string(),
            destination: destination.to_string(),
            registered_at: OffsetDateTime::now_utc(),
        };
        shipments.insert(id.to_string(), shipment.clone());
        Ok(shipment)
    }

    /// Looks up a shipment.
    pub fn get(&self, id: &str) -> Option<Shipment> {
        self.shipments.read().get(id).cloned()
    }

    /// Number of shipments.
    pub fn len(&self) -> usize {
        self.shipments.read().len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.shipments.read().is_empty()
    }
}

/// `/ship <id> <destination>`
#[derive(Debug, Clone)]
pub struct ShipmentIntake {
    book: Arc<ShipmentBook>,
}

impl ShipmentIntake {
    /// Creates an intake writing to `book`.
    pub fn new(book: Arc<ShipmentBook>) -> Self {
        Self { book }
    }
}

#[async_trait]
impl Capability for ShipmentIntake {
    fn name(&self) -> &'static str {
        "logistics.intake"
    }

    async fn handle(&self, input: &str) -> CapabilityResult<String> {
        let Some((id, destination)) = input.trim().split_once(char::is_whitespace) else {
            return Err(CapabilityError::validation(
                "укажите номер отправления и пункт назначения, например: A-17 Казань",
            ));
        };
        let destination = destination.trim();

        let shipment = self.book.register(id, destination)?;
        Ok(format!(
            "Отправление {} зарегистрировано, пункт назначения: {}.",
            shipment.id, shipment.destination
        ))
    }
}

/// `/track <id>`
#[derive(Debug, Clone)]
pub struct ShipmentTracker {
    book: Arc<ShipmentBook>,
}

impl ShipmentTracker {
    /// Creates a tracker reading from `book`.
    pub fn new(book: Arc<ShipmentBook>) -> Self {
        Self { book }
    }
}

#[async_trait]
impl Capability for ShipmentTracker {
    fn name(&self) -> &'static str {
        "logistics.tracking"
    }

    async fn handle(&self, input: &str) -> CapabilityResult<String> {
        let id = input.trim();
        if id.is_empty() {
            return Err(CapabilityError::validation("укажите номер отправления"));
        }
        let Some(shipment) = self.book.get(id) else {
            return Err(CapabilityError::validation(format!(
                "отправление {id} не найдено"
            )));
        };

        let registered = shipment
            .registered_at
            .format(format_description!("[year]-[month]-[day] [hour]:[minute] UTC"))
            .map_err(|e| CapabilityError::io(format!("failed to format timestamp: {e}")))?;
        Ok(format!(
            "Отправление {}: принято {registered}, пункт назначения: {}.",
            shipment.id, shipment.destination
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (ShipmentIntake, ShipmentTracker, Arc<ShipmentBook>) {
        let book = Arc::new(ShipmentBook::new());
        (
            ShipmentIntake::new(Arc::clone(&book)),
            ShipmentTracker::new(Arc::clone(&book)),
            book,
        )
    }

    #[tokio::test]
    async fn test_ship_then_track() {
        let (intake, tracker, book) = pair();

        let reply = intake.handle("A-17 Нижний Новгород").await.unwrap();
        assert_eq!(
            reply,
            "Отправление A-17 зарегистрировано, пункт назначения: Нижний Новгород."
        );
        assert_eq!(book.len(), 1);

        let status = tracker.handle(" A-17 ").await.unwrap();
        assert!(status.starts_with("Отправление A-17: принято "));
        assert!(status.ends_with("пункт назначения: Нижний Новгород."));
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let (intake, _, book) = pair();
        intake.handle("X1 Omsk").await.unwrap();
        assert!(matches!(
            intake.handle("X1 Tomsk").await,
            Err(CapabilityError::Validation(_))
        ));
        assert_eq!(book.get("X1").unwrap().destination, "Omsk");
    }

    #[tokio::test]
    async fn test_bad_input() {
        let (intake, tracker, book) = pair();
        assert!(intake.handle("only-id").await.is_err());
        assert!(tracker.handle("missing").await.is_err());
        assert!(tracker.handle("").await.is_err());
        assert!(book.is_empty());
    }
}
