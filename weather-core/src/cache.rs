//! Response cache for weather readings.
//!
//! The weather client talks to a [`Cache`] trait object so the backing store
//! can be swapped. [`MemoryCache`] keeps entries in-process and measures
//! expiry with `tokio::time::Instant`, so tests can drive it with tokio's
//! paused clock. Expired entries are dropped when read and swept on every
//! write.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::model::WeatherReading;

/// Key/value store with per-entry expiry.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Return the value for `key` if present and not yet expired.
    async fn get(&self, key: &str) -> Option<WeatherReading>;

    /// Insert or overwrite `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: WeatherReading, ttl: Duration);
}

#[derive(Debug)]
struct Entry {
    value: WeatherReading,
    expires_at: Instant,
}

/// In-process cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryCache {
    /// Number of stored entries, including expired ones not swept yet.
    pub(crate) async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub(crate) async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Option<WeatherReading> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: drop it unless a writer refreshed it meanwhile.
        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(key);
        }
        None
    }

    /// Writes also sweep every expired entry, so keys that are never read
    /// again do not stay in memory.
    async fn set(&self, key: &str, value: WeatherReading, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
    }
}
