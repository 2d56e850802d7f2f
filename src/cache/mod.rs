//! Cache Module
//!
//! Cache-aside orchestration over an external key-value store, plus an
//! in-memory store for tests and local runs.

mod aside;
mod entry;
mod hooks;
mod stats;
mod store;


use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

// Re-export public types
pub use aside::{CacheAside, Fetched, Source};
pub use entry::CacheEntry;
pub use hooks::{MutationObserver, WritePolicy};
pub use stats::{CacheStats, StatsRecorder};
pub use store::MemoryStore;

// == Key-Value Store ==
/// String-keyed store with optional per-entry TTL (Redis-like).
///
/// Each call is expected to be atomic on its own; nothing coordinates across
/// calls.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns true if a live entry exists under `key`.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Returns the payload under `key`, or `None` on a miss.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `payload` under `key`, replacing any previous entry.
    ///
    /// A `None` TTL means the entry never expires.
    async fn set(&self, key: &str, payload: String, ttl: Option<Duration>) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}
