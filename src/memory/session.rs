//! Session-keyed conversation memory with expiry
//!
//! A session's memory lives for `ttl` after its last write. Expired sessions
//! are destroyed lazily when touched, or in bulk by `purge_expired`.

use crate::memory::ConversationMemory;
use crate::providers::Message;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct SessionEntry {
    memory: ConversationMemory,
    last_write: Instant,
}

/// In-process store of conversation memories keyed by session id
///
/// Sessions are independent; the lock is only held for the duration of a
/// read or a write, never across an I/O call.
///
/// # Examples
///
/// ```
/// use helpdesk::memory::SessionMemoryStore;
/// use std::time::Duration;
///
/// let store = SessionMemoryStore::new(3000, Duration::from_secs(300));
/// store.record_turn("s1", "Hi", "Hello! How can I help?");
/// assert_eq!(store.history("s1").len(), 2);
/// assert!(store.history("s2").is_empty());
/// ```
#[derive(Debug)]
pub struct SessionMemoryStore {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    token_limit: usize,
    ttl: Duration,
}

impl SessionMemoryStore {
    /// Create an empty store
    ///
    /// # Arguments
    ///
    /// * `token_limit` - Token budget of each session window
    /// * `ttl` - How long a session survives after its last write
    pub fn new(token_limit: usize, ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            token_limit,
            ttl,
        }
    }

    /// Live turns of a session, oldest first
    ///
    /// Returns an empty list for unknown or expired sessions.
    pub fn history(&self, session: &str) -> Vec<Message> {
        self.history_at(session, Instant::now())
    }

    /// Append a user query and the assistant reply to a session
    ///
    /// Starts a new window if the session is unknown or expired, and
    /// refreshes the expiry.
    pub fn record_turn(&self, session: &str, user: &str, assistant: &str) {
        self.record_turn_at(session, user, assistant, Instant::now());
    }

    /// Destroy every expired session, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    /// Forget a session immediately
    pub fn clear(&self, session: &str) {
        self.lock().remove(session);
    }

    /// Number of sessions currently held, expired or not
    pub fn session_count(&self) -> usize {
        self.lock().len()
    }

    /// Estimated tokens held by a session
    pub fn token_count(&self, session: &str) -> usize {
        self.lock()
            .get(session)
            .map(|entry| entry.memory.token_count())
            .unwrap_or(0)
    }

    /// Token budget applied to each session
    pub fn token_limit(&self) -> usize {
        self.token_limit
    }

    /// Configured expiry
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub(crate) fn history_at(&self, session: &str, now: Instant) -> Vec<Message> {
        let mut sessions = self.lock();
        let expired = match sessions.get(session) {
            Some(entry) if !self.is_expired(entry, now) => return entry.memory.turns().to_vec(),
            Some(_) => true,
            None => false,
        };
        if expired {
            tracing::debug!("Session {} expired, discarding memory", session);
            sessions.remove(session);
        }
        Vec::new()
    }

    pub(crate) fn record_turn_at(&self, session: &str, user: &str, assistant: &str, now: Instant) {
        let mut sessions = self.lock();
        let expired = sessions
            .get(session)
            .map(|entry| self.is_expired(entry, now))
            .unwrap_or(false);
        if expired {
            sessions.remove(session);
        }

        let token_limit = self.token_limit;
        let entry = sessions
            .entry(session.to_string())
            .or_insert_with(|| SessionEntry {
                memory: ConversationMemory::new(token_limit),
                last_write: now,
            });
        entry.memory.push_message(Message::user(user));
        entry.memory.push_message(Message::assistant(assistant));
        entry.last_write = now;
    }

    pub(crate) fn purge_expired_at(&self, now: Instant) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| now.saturating_duration_since(entry.last_write) <= self.ttl);
        before - sessions.len()
    }

    fn is_expired(&self, entry: &SessionEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.last_write) > self.ttl
    }

    // A poisoned lock only means another thread panicked mid-update; the map
    // itself is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
