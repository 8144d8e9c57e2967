//! In-memory session registry.
//!
//! Sessions live for the lifetime of the process and expire after a fixed
//! TTL. Expired entries are dropped lazily on lookup and on every `open`.
//!
//! A poisoned lock fails closed: lookups report no session.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::domain::credentials::generate_session_token;
use crate::ports::SessionStore;

struct Session {
    username: String,
    expires_at: Instant,
}

/// Session registry backed by a `HashMap`.
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    ttl: Duration,
}

impl MemorySessionStore {
    /// Create a registry whose sessions expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Number of live sessions.
    #[must_use]
    pub fn active_count(&self) -> usize {
        let now = Instant::now();
        match self.sessions.lock() {
            Ok(sessions) => sessions.values().filter(|s| s.expires_at > now).count(),
            Err(_) => 0,
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn open(&self, username: &str) -> Option<String> {
        let now = Instant::now();
        let Ok(mut sessions) = self.sessions.lock() else {
            tracing::error!("Session registry lock poisoned; session not opened");
            return None;
        };

        let token = generate_session_token();
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(
            token.clone(),
            Session {
                username: username.to_string(),
                expires_at: now + self.ttl,
            },
        );

        tracing::debug!("Opened session for {}", username);
        Some(token)
    }

    fn lookup(&self, token: &str) -> Option<String> {
        let mut sessions = self.sessions.lock().ok()?;
        let now = Instant::now();
        let entry = sessions
            .get(token)
            .map(|s| (s.expires_at > now, s.username.clone()));
        match entry {
            Some((true, username)) => Some(username),
            Some((false, _)) => {
                sessions.remove(token);
                tracing::debug!("Session expired");
                None
            }
            None => None,
        }
    }

    fn revoke(&self, token: &str) -> bool {
        match self.sessions.lock() {
            Ok(mut sessions) => sessions.remove(token).is_some(),
            Err(_) => false,
        }
    }
}
