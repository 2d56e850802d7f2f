//! Record Cache - language-aware cache-aside for persistent records
//!
//! Read-through caching of single records and filtered collections over an
//! external key-value store, with explicit refresh and invalidation after
//! mutations.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod filters;
pub mod key;
pub mod lang;
pub mod models;
pub mod record;
pub mod repository;
pub mod tasks;

pub use api::AppState;
pub use cache::{
    CacheAside, CacheStats, Fetched, KeyValueStore, MemoryStore, MutationObserver, Source,
    WritePolicy,
};
pub use config::{CacheSettings, Config};
pub use error::{CacheError, Result};
pub use filters::{FilterValue, Filters};
pub use key::KeyBuilder;
pub use lang::{Lang, Languages};
pub use record::{CacheableRecord, RecordRepository};
pub use repository::MemoryRepository;
pub use tasks::spawn_cleanup_task;
