//! # Switchboard Capabilities
//!
//! Domain services behind the dispatcher. Each one implements
//! [`Capability`](switchboard_core::Capability) and does its own parsing of
//! the raw text it receives.
//!
//! | Capability | Input | Backing |
//! |------------|-------|---------|
//! | [`WeatherService`] | city | OpenWeatherMap-compatible HTTP API |
//! | [`EventLog`] | title | memory + `events.jsonl` |
//! | [`DataAnalyzer`] | `2,4,6` | none |
//! | [`ImageProcessor`] | `src [dst]` | local files |
//! | [`PaymentProcessor`] | `amount user` | memory + `payments.jsonl` |
//! | [`Notifier`] | text | memory + `notifications.jsonl` |
//! | [`Reporter`] | ignored | reads the other services |
//! | [`FeedbackBox`] | text | `feedback.jsonl` |
//! | [`ShipmentIntake`] / [`ShipmentTracker`] | `id destination` / `id` | shared [`ShipmentBook`] |

pub mod analysis;
pub mod events;
pub mod feedback;
pub mod imaging;
pub mod journal;
pub mod logistics;
pub mod notify;
pub mod payment;
pub mod report;
pub mod weather;

pub use analysis::DataAnalyzer;
pub use events::{EventLog, EventRecord};
pub use feedback::{FeedbackBox, FeedbackRecord};
pub use imaging::ImageProcessor;
pub use journal::Journal;
pub use logistics::{Shipment, ShipmentBook, ShipmentIntake, ShipmentTracker};
pub use notify::{Notification, Notifier};
pub use payment::{PaymentProcessor, PaymentRecord};
pub use report::Reporter;
pub use weather::{WeatherConfig, WeatherService};
