//! The closed set of pending intents.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RoutingError;

/// Which capability the next free-text message from a chat goes to.
///
/// Intents are created by menu selections and consumed by the next free-text
/// message. Matching from wire data is exact: no case folding, no prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Weather lookup for a city.
    Weather,
    /// Record an event by title.
    Event,
    /// Average a comma-separated list of integers.
    Analyze,
    /// Record a payment (`amount user`).
    Payment,
    /// Convert an image to grayscale.
    Image,
}

impl Intent {
    /// Every intent, in menu order.
    pub const ALL: [Intent; 5] = [
        Intent::Weather,
        Intent::Event,
        Intent::Analyze,
        Intent::Payment,
        Intent::Image,
    ];

    /// Returns the callback payload carried by the menu button for this intent.
    pub fn callback_data(self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Event => "event",
            Self::Analyze => "analyze",
            Self::Payment => "payment",
            Self::Image => "process_image",
        }
    }

    /// Resolves a callback payload back into an intent.
    pub fn from_callback(data: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|intent| intent.callback_data() == data)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.callback_data())
    }
}

impl FromStr for Intent {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_callback(s).ok_or_else(|| RoutingError::UnknownIntent(s.to_string()))
    }
}
