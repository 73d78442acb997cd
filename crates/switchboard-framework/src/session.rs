//! Per-chat session storage.
//!
//! [`SessionStore`] owns every [`Session`]. It never fails: reading an unknown
//! chat yields an idle session, and writes upsert. Read-then-write is *not*
//! atomic here; callers serialize events per chat.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use switchboard_core::{ChatId, Intent, Session, SessionMutation};
use tracing::{debug, trace};

/// Thread-safe map of chat id to session.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<ChatId, Session>>,
    /// Sessions untouched for longer than this read as idle.
    ttl: Option<Duration>,
}

impl SessionStore {
    /// Creates an empty store without expiry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store whose sessions expire after `ttl`.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Some(ttl),
        }
    }

    /// Returns the configured expiry, if any.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Returns the session for `chat_id`, or an idle one if absent or expired.
    pub fn read(&self, chat_id: ChatId) -> Session {
        let sessions = self.sessions.read();
        match sessions.get(&chat_id) {
            Some(session) if !self.is_expired(session, Instant::now()) => session.clone(),
            _ => Session::idle(chat_id),
        }
    }

    /// Replaces the pending intent for `chat_id`, creating the session if needed.
    pub fn write(&self, chat_id: ChatId, intent: Option<Intent>) {
        let mut sessions = self.sessions.write();
        let session = sessions
            .entry(chat_id)
            .or_insert_with(|| Session::idle(chat_id));
        session.pending_intent = intent;
        session.last_updated = Instant::now();
        trace!(chat_id = %chat_id, intent = ?intent, "Session written");
    }

    /// Applies a dispatcher mutation. [`SessionMutation::Keep`] is a no-op.
    pub fn apply(&self, chat_id: ChatId, mutation: SessionMutation) {
        if let Some(intent) = mutation.target() {
            self.write(chat_id, intent);
        }
    }

    /// Drops expired sessions and returns how many were removed.
    ///
    /// Always returns `0` for a store without TTL.
    pub fn evict_expired(&self) -> usize {
        if self.ttl.is_none() {
            return 0;
        }

        let now = Instant::now();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, session| !self.is_expired(session, now));
        let evicted = before - sessions.len();

        if evicted > 0 {
            debug!(evicted, remaining = sessions.len(), "Evicted expired sessions");
        }
        evicted
    }

    /// Returns the number of stored sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Returns `true` if no session is stored.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    fn is_expired(&self, session: &Session, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.duration_since(session.last_updated) > ttl)
    }
}
