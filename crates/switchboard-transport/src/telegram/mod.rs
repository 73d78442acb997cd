//! Telegram Bot API transport.

mod client;
mod poller;
mod sender;
pub mod types;

pub use client::{DEFAULT_API_URL, TelegramClient, TelegramConfig};
pub use poller::TelegramPoller;
pub use sender::TelegramSender;
