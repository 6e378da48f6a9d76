//! In-process session store for the Actix session middleware.
//!
//! Session state lives server side, keyed by a random 64-character id that is
//! the only thing the signed cookie carries. One store instance is shared by
//! every worker; clones share the same map.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};

use actix_session::storage::{LoadError, SaveError, SessionKey, SessionStore, UpdateError};
use actix_web::cookie::time::Duration;
use rand::Rng;
use rand::distributions::Alphanumeric;
use tokio::sync::RwLock;
use tracing::debug;

/// Length of generated session keys.
pub const SESSION_KEY_LEN: usize = 64;
/// Default session lifetime (30 days).
pub const DEFAULT_SESSION_TTL: Duration = Duration::days(30);
/// Longest lifetime an entry is kept, whatever ttl the middleware asks for.
pub const MAX_SESSION_TTL: Duration = Duration::days(3650);

type SessionState = HashMap<String, String>;

#[derive(Debug, Clone)]
struct Entry {
    state: SessionState,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Shared in-memory session store with per-entry expiry.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry; returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        let purged = before - entries.len();
        if purged > 0 {
            debug!(purged, "purged expired sessions");
        }
        purged
    }

    /// Number of stored entries, expired ones included until purged.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

fn expiry(ttl: &Duration) -> Instant {
    let now = Instant::now();
    let seconds = ttl.whole_seconds().clamp(0, MAX_SESSION_TTL.whole_seconds());
    let lifetime = StdDuration::from_secs(u64::try_from(seconds).unwrap_or(0));
    now.checked_add(lifetime).unwrap_or(now)
}

fn generate_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_KEY_LEN)
        .map(char::from)
        .collect()
}

fn session_key(raw: String) -> Result<SessionKey, anyhow::Error> {
    SessionKey::try_from(raw).map_err(|err| anyhow::anyhow!("generated session key rejected: {err}"))
}

impl SessionStore for MemorySessionStore {
    async fn load(&self, session_key: &SessionKey) -> Result<Option<SessionState>, LoadError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(session_key.as_ref()) {
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.state.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }
        // Expired: drop it so it cannot be revived by update_ttl.
        self.entries.write().await.remove(session_key.as_ref());
        Ok(None)
    }

    async fn save(&self, session_state: SessionState, ttl: &Duration) -> Result<SessionKey, SaveError> {
        let mut entries = self.entries.write().await;
        let mut raw = generate_key();
        while entries.contains_key(&raw) {
            raw = generate_key();
        }
        entries.insert(
            raw.clone(),
            Entry {
                state: session_state,
                expires_at: expiry(ttl),
            },
        );
        session_key(raw).map_err(SaveError::Other)
    }

    async fn update(
        &self,
        session_key: SessionKey,
        session_state: SessionState,
        ttl: &Duration,
    ) -> Result<SessionKey, UpdateError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        match entries.get_mut(session_key.as_ref()) {
            Some(entry) if entry.is_live(now) => {
                entry.state = session_state;
                entry.expires_at = expiry(ttl);
                Ok(session_key)
            }
            _ => {
                // Unknown or expired key: issue a fresh one rather than resurrect it.
                entries.remove(session_key.as_ref());
                drop(entries);
                self.save(session_state, ttl).await.map_err(|err| match err {
                    SaveError::Serialization(inner) => UpdateError::Serialization(inner),
                    SaveError::Other(inner) => UpdateError::Other(inner),
                })
            }
        }
    }

    async fn update_ttl(&self, session_key: &SessionKey, ttl: &Duration) -> Result<(), anyhow::Error> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(session_key.as_ref()) {
            if entry.is_live(now) {
                entry.expires_at = expiry(ttl);
            }
        }
        Ok(())
    }

    async fn delete(&self, session_key: &SessionKey) -> Result<(), anyhow::Error> {
        self.entries.write().await.remove(session_key.as_ref());
        Ok(())
    }
}
