//! In-memory admin sessions.
//!
//! A record maps the admin username to an expiry instant. Records are only
//! created after a successful credential check and are never renewed while
//! still valid; an expired record is replaced on the next successful login.
//! There is no background eviction.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Created,
    Reused,
}

#[derive(Debug)]
pub struct AdminSessions {
    ttl: Duration,
    records: RwLock<HashMap<String, Instant>>,
}

impl AdminSessions {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Record a session for an already-authenticated `username`.
    pub async fn admit(&self, username: &str) -> SessionStatus {
        let now = Instant::now();
        {
            let records = self.records.read().await;
            if records.get(username).is_some_and(|expiry| *expiry > now) {
                return SessionStatus::Reused;
            }
        }

        let mut records = self.records.write().await;
        // another request may have created it between the two locks
        if records.get(username).is_some_and(|expiry| *expiry > now) {
            return SessionStatus::Reused;
        }
        records.insert(username.to_string(), now + self.ttl);
        SessionStatus::Created
    }

    #[cfg(test)]
    pub(crate) async fn expiry(&self, username: &str) -> Option<Instant> {
        self.records.read().await.get(username).copied()
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    #[cfg(test)]
    pub(crate) async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
