//! Session records cached per bearer token.
//!
//! Records are written by the login flow, read by the auth gate and removed on
//! logout. They are keyed by the raw token under `session:<token>` and expire
//! after the TTL resolved at startup.

use crate::cache::{Cache, CacheBackend, CacheError};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const SESSION_KEY_PREFIX: &str = "session:";

/// Identity data cached for an authenticated customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub customer_id: u64,
    pub phone: String,
    pub name: String,
}

/// Reads and writes [`SessionRecord`]s in the shared cache
#[derive(Clone)]
pub struct SessionStore {
    cache: Arc<Cache>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(cache: Arc<Cache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Lifetime applied to every stored session
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Persist a session for `token`, replacing any existing record
    pub async fn store(&self, token: &str, record: &SessionRecord) -> Result<(), CacheError> {
        self.cache.set(&session_key(token), record, self.ttl).await?;
        debug!(
            "Stored session for customer {} (ttl {}s)",
            record.customer_id,
            self.ttl.as_secs()
        );
        Ok(())
    }

    /// Look up the session for `token`; `Ok(None)` when absent or expired
    pub async fn fetch(&self, token: &str) -> Result<Option<SessionRecord>, CacheError> {
        self.cache.get(&session_key(token)).await
    }

    /// Remove the session for `token`; removing an absent session succeeds
    pub async fn delete(&self, token: &str) -> Result<(), CacheError> {
        self.cache.delete(&session_key(token)).await
    }
}

fn session_key(token: &str) -> String {
    format!("{SESSION_KEY_PREFIX}{token}")
}
