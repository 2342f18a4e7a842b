//! In-memory session store with expiry
//!
//! Sessions hold a generated question set for `ttl`. The store is capped;
//! once full, the oldest tenth is evicted before a new session goes in.

use std::collections::HashMap;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::Rng;
use rand::distr::Alphanumeric;

use crate::questions::Question;

/// A stored question set
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub questions: Vec<Question>,
    pub created_at: Instant,
    pub expires_at: Instant,
    pub access_count: u32,
}

/// Session counts for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub total: usize,
    pub active: usize,
    pub expired: usize,
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: HashMap<String, Session>,
    ttl: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Store `questions` and return the new session id
    pub fn create(&mut self, questions: Vec<Question>, now: Instant) -> String {
        if self.sessions.len() >= self.max_sessions {
            self.evict_oldest();
        }

        let id = generate_session_id();
        log::info!(
            "Session created: {} ({} questions, {} active)",
            id,
            questions.len(),
            self.sessions.len() + 1
        );
        self.sessions.insert(
            id.clone(),
            Session {
                id: id.clone(),
                questions,
                created_at: now,
                expires_at: now + self.ttl,
                access_count: 0,
            },
        );
        id
    }

    /// Questions for `id`, or `None` if unknown or expired (expired entries
    /// are dropped on the spot)
    pub fn get(&mut self, id: &str, now: Instant) -> Option<&[Question]> {
        let expired = self.sessions.get(id)?.expires_at < now;
        if expired {
            self.sessions.remove(id);
            log::info!("Session expired: {}", id);
            return None;
        }
        let session = self.sessions.get_mut(id)?;
        session.access_count += 1;
        log::debug!("Session accessed: {} (count {})", id, session.access_count);
        Some(&session.questions)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Drop every expired session; returns how many were removed
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.expires_at >= now);
        let cleaned = before - self.sessions.len();
        if cleaned > 0 {
            log::info!(
                "Cleaned up {} expired sessions. Active: {}",
                cleaned,
                self.sessions.len()
            );
        }
        cleaned
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn stats(&self, now: Instant) -> SessionStats {
        let active = self
            .sessions
            .values()
            .filter(|s| s.expires_at > now)
            .count();
        SessionStats {
            total: self.sessions.len(),
            active,
            expired: self.sessions.len() - active,
        }
    }

    fn evict_oldest(&mut self) {
        let mut by_age: Vec<(Instant, String)> = self
            .sessions
            .values()
            .map(|s| (s.created_at, s.id.clone()))
            .collect();
        by_age.sort();
        let to_remove = (self.max_sessions / 10).max(1);
        for (_, id) in by_age.into_iter().take(to_remove) {
            self.sessions.remove(&id);
        }
        log::warn!("Session limit reached. Removed {} oldest sessions.", to_remove);
    }
}

/// `<unix-millis>-<26 random alphanumerics>`
pub fn generate_session_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(26)
        .map(char::from)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    format!("{millis}-{suffix}")
}
