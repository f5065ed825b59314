//! Short-lived conversation list cache.
//!
//! Callers read through [`ConversationCache::get_with`]: a fresh snapshot is
//! served without a fetch, a miss triggers one, and a failed fetch falls back
//! to whatever stale snapshot is still held.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use eventflow_api::Conversation;

/// TTL-bounded cache of the conversation list.
///
/// Snapshots are stamped with the instant their fetch *started*, so a slow
/// response can never overwrite data from a fetch that began later.
#[derive(Debug)]
pub struct ConversationCache {
    ttl: Duration,
    inner: Mutex<Slot>,
}

#[derive(Debug, Default)]
struct Slot {
    conversations: Vec<Conversation>,
    fetched_at: Option<Instant>,
}

impl ConversationCache {
    /// Creates a cache whose snapshots stay fresh for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(Slot::default()),
        }
    }

    /// Returns the cached list if it is younger than the TTL.
    #[must_use]
    pub fn fresh(&self) -> Option<Vec<Conversation>> {
        let Ok(slot) = self.inner.lock() else {
            return None;
        };
        slot.fetched_at
            .filter(|at| at.elapsed() < self.ttl)
            .map(|_| slot.conversations.clone())
    }

    /// Returns the cached list regardless of age.
    #[must_use]
    pub fn stale(&self) -> Option<Vec<Conversation>> {
        let Ok(slot) = self.inner.lock() else {
            return None;
        };
        slot.fetched_at.map(|_| slot.conversations.clone())
    }

    /// Stores a snapshot stamped with the instant its fetch started.
    ///
    /// A snapshot from an older fetch never replaces one from a newer fetch.
    pub fn store(&self, conversations: Vec<Conversation>, fetched_at: Instant) {
        if let Ok(mut slot) = self.inner.lock() {
            if slot.fetched_at.is_none_or(|current| fetched_at >= current) {
                slot.conversations = conversations;
                slot.fetched_at = Some(fetched_at);
            }
        }
    }

    /// Drops the snapshot so the next read fetches.
    pub fn invalidate(&self) {
        if let Ok(mut slot) = self.inner.lock() {
            slot.conversations.clear();
            slot.fetched_at = None;
        }
    }

    /// Reads through the cache.
    ///
    /// # Errors
    ///
    /// Returns the fetch error only when no stale snapshot exists to serve
    /// in its place.
    pub async fn get_with<F, Fut, E>(&self, fetch: F) -> std::result::Result<Vec<Conversation>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Vec<Conversation>, E>>,
    {
        if let Some(conversations) = self.fresh() {
            return Ok(conversations);
        }
        let started = Instant::now();
        match fetch().await {
            Ok(conversations) => {
                self.store(conversations.clone(), started);
                Ok(conversations)
            }
            Err(err) => self.stale().map_or(Err(err), Ok),
        }
    }
}
