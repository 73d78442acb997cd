//! Per-chat conversation state.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::intent::Intent;

/// Identifier of a chat on the transport side.
///
/// Telegram chat identifiers are signed 64-bit integers (group chats are
/// negative), so the same representation is used here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl ChatId {
    /// Returns the raw identifier.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Conversation state for a single chat.
///
/// A chat is either idle (`pending_intent == None`) or waiting for exactly one
/// kind of follow-up text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The chat this session belongs to.
    pub chat_id: ChatId,
    /// What the next free-text message from this chat should be routed to.
    pub pending_intent: Option<Intent>,
    /// When the pending intent was last written.
    pub last_updated: Instant,
}

impl Session {
    /// Creates an idle session for `chat_id`.
    pub fn idle(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            pending_intent: None,
            last_updated: Instant::now(),
        }
    }

    /// Returns `true` when no follow-up input is expected.
    pub fn is_idle(&self) -> bool {
        self.pending_intent.is_none()
    }
}

/// A state change the dispatcher asks the session store to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMutation {
    /// Leave the session as it is.
    Keep,
    /// Wait for free text routed to the given intent.
    Arm(Intent),
    /// Return to idle.
    Clear,
}

impl SessionMutation {
    /// Returns the pending intent this mutation writes, or `None` for [`Keep`](Self::Keep).
    pub fn target(self) -> Option<Option<Intent>> {
        match self {
            Self::Keep => None,
            Self::Arm(intent) => Some(Some(intent)),
            Self::Clear => Some(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_session() {
        let session = Session::idle(ChatId(42));
        assert!(session.is_idle());
        assert_eq!(session.chat_id.get(), 42);
    }

    #[test]
    fn test_mutation_target() {
        assert_eq!(SessionMutation::Keep.target(), None);
        assert_eq!(SessionMutation::Clear.target(), Some(None));
        assert_eq!(
            SessionMutation::Arm(Intent::Payment).target(),
            Some(Some(Intent::Payment))
        );
    }

    #[test]
    fn test_chat_id_is_transparent() {
        let json = serde_json::to_string(&ChatId(-100)).unwrap();
        assert_eq!(json, "-100");
    }
}
