//! # Switchboard Transport
//!
//! Telegram Bot API implementations of the transport traits defined in
//! `switchboard-core`.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  switchboard-runtime │  (lanes, dispatch loop)
//! ├──────────────────────┤
//! │  switchboard-core    │  (EventSource / ReplySink)
//! ├──────────────────────┤
//! │  switchboard-transport│ <- This crate
//! ├──────────────────────┤
//! │  Telegram Bot API    │
//! └──────────────────────┘
//! ```
//!
//! | Type | Trait | Bot API methods |
//! |------|-------|-----------------|
//! | [`TelegramPoller`] | `EventSource` | `getUpdates`, `answerCallbackQuery` |
//! | [`TelegramSender`] | `ReplySink` | `sendMessage` |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! let client = TelegramClient::new(TelegramConfig::new(token))?;
//! let mut poller = TelegramPoller::new(client.clone());
//! let sender = TelegramSender::new(client);
//!
//! let events = poller.next_batch().await?;
//! ```

pub mod backoff;
pub mod telegram;

pub use backoff::Backoff;
pub use telegram::{TelegramClient, TelegramConfig, TelegramPoller, TelegramSender};
