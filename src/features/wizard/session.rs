//! In-memory per-user wizard sessions
//!
//! Sessions are not persisted: a restart drops them and users start over. A session
//! left untouched for longer than the idle timeout is treated as absent and evicted.

use dashmap::DashMap;
use std::time::{Duration, Instant};

use super::state::WizardState;

/// Idle time after which an unfinished dialogue is forgotten
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy)]
struct Session {
    state: WizardState,
    touched_at: Instant,
}

pub struct SessionStore {
    sessions: DashMap<String, Session>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Current state of a user; `AwaitingEntry` when there is no live session
    pub fn state(&self, user_id: &str) -> WizardState {
        let now = Instant::now();
        let live = self
            .sessions
            .get(user_id)
            .map(|entry| (entry.state, self.is_live(&entry, now)));

        match live {
            Some((state, true)) => state,
            Some((_, false)) => {
                self.sessions
                    .remove_if(user_id, |_, session| !self.is_live(session, now));
                WizardState::AwaitingEntry
            }
            None => WizardState::AwaitingEntry,
        }
    }

    pub fn has_session(&self, user_id: &str) -> bool {
        self.state(user_id) != WizardState::AwaitingEntry
    }

    /// Store a state and refresh the idle timer; also sweeps expired sessions
    pub fn set(&self, user_id: &str, state: WizardState) {
        let now = Instant::now();
        self.sessions.retain(|_, session| self.is_live(session, now));

        if state == WizardState::AwaitingEntry {
            self.sessions.remove(user_id);
        } else {
            self.sessions.insert(
                user_id.to_string(),
                Session {
                    state,
                    touched_at: now,
                },
            );
        }
    }

    pub fn clear(&self, user_id: &str) {
        self.sessions.remove(user_id);
    }

    /// Number of stored sessions, expired ones not yet swept included
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn is_live(&self, session: &Session, now: Instant) -> bool {
        now.duration_since(session.touched_at) < self.ttl
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
