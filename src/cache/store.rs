//! Memory Store Module
//!
//! In-process `KeyValueStore` backed by a HashMap with per-entry expiry.
//! Expired entries read as absent and are dropped lazily on access or by
//! `cleanup_expired`. There is no capacity limit.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{CacheEntry, KeyValueStore};
use crate::error::Result;

// == Memory Store ==
/// Thread-safe in-memory key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    // == Length ==
    /// Returns the number of stored entries, expired ones included until
    /// they are cleaned up.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Returns the remaining lifetime of a live entry.
    ///
    /// The outer `None` means the key is absent; the inner `None` means the
    /// entry never expires.
    pub async fn ttl(&self, key: &str) -> Option<Option<Duration>> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(CacheEntry::ttl_remaining)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).is_some_and(|entry| !entry.is_expired()))
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.payload.clone())),
                Some(_) => {}
            }
        }

        // Expired: drop it unless it was rewritten in between
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(CacheEntry::is_expired) {
            entries.remove(key);
        }
        Ok(entries
            .get(key)
            .map(|entry| entry.payload.clone()))
    }

    async fn set(&self, key: &str, payload: String, ttl: Option<Duration>) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), CacheEntry::new(payload, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}
