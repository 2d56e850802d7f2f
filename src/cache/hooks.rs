//! Mutation Hooks
//!
//! Explicit post-mutation callbacks. The application calls these after a
//! successful create, update or delete in its persistence layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::{CacheAside, KeyValueStore};
use crate::error::Result;
use crate::record::{CacheableRecord, RecordRepository};

// == Write Policy ==
/// What create and update hooks do after refreshing single-record entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Also drop every collection entry of every language variant, filtered
    /// ones included, so lists pick up the change on the next read.
    #[default]
    CacheAndInvalidateCollections,
    /// Only refresh single-record entries. Collection entries stay until
    /// their TTL runs out.
    CacheOnly,
}

// == Mutation Observer ==
/// Receives record lifecycle events.
#[async_trait]
pub trait MutationObserver<R: CacheableRecord>: Send + Sync {
    /// Called after `record` was created.
    async fn on_created(&self, record: &R) -> Result<()>;

    /// Called after `record` was updated.
    async fn on_updated(&self, record: &R) -> Result<()>;

    /// Called after `record` was deleted.
    async fn on_deleted(&self, record: &R) -> Result<()>;
}

impl<R, P, S> CacheAside<R, P, S>
where
    R: CacheableRecord,
    P: RecordRepository<R>,
    S: KeyValueStore,
{
    /// Re-caches `record` for every language variant and applies the
    /// configured write policy.
    async fn refresh(&self, record: &R) -> Result<()> {
        for lang in self.settings().languages.iter() {
            self.cache_single(record, Some(lang.as_str()), None).await?;
        }

        if self.settings().write_policy == WritePolicy::CacheAndInvalidateCollections {
            self.invalidate_all_collections().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl<R, P, S> MutationObserver<R> for CacheAside<R, P, S>
where
    R: CacheableRecord,
    P: RecordRepository<R>,
    S: KeyValueStore,
{
    async fn on_created(&self, record: &R) -> Result<()> {
        debug!(id = %record.id(), "record created");
        self.refresh(record).await
    }

    async fn on_updated(&self, record: &R) -> Result<()> {
        debug!(id = %record.id(), "record updated");
        self.refresh(record).await
    }

    async fn on_deleted(&self, record: &R) -> Result<()> {
        debug!(id = %record.id(), "record deleted");
        self.invalidate(record, None).await?;
        self.invalidate_filtered_collections().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryStore, Source};
    use crate::config::CacheSettings;
    use crate::filters::Filters;
    use crate::lang::Lang;
    use crate::repository::MemoryRepository;
    use serde_json::{json, Value};
    use std::sync::Arc;

    #[derive(Debug, Clone, Serialize)]
    struct Note {
        id: u32,
        body: String,
    }

    impl CacheableRecord for Note {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }

        fn to_payload(&self, lang: &Lang) -> Value {
            json!({ "id": self.id, "body": format!("[{}] {}", lang, self.body) })
        }
    }

    fn note(id: u32, body: &str) -> Note {
        Note {
            id,
            body: body.to_string(),
        }
    }

    fn setup(policy: WritePolicy) -> (Arc<MemoryRepository<Note>>, CacheAside<Note, MemoryRepository<Note>, MemoryStore>) {
        let repository = Arc::new(MemoryRepository::new());
        let settings = CacheSettings::builder().write_policy(policy).build();
        let cache = CacheAside::new(repository.clone(), Arc::new(MemoryStore::new()), settings);
        (repository, cache)
    }

    #[tokio::test]
    async fn test_on_created_caches_every_variant() {
        let (repository, cache) = setup(WritePolicy::default());
        let n = note(1, "hello");
        repository.insert(n.clone());

        cache.on_created(&n).await.unwrap();

        for lang in ["uz", "ru", "en"] {
            let fetched = cache.fetch_single(&1, Some(lang), None).await.unwrap();
            assert_eq!(fetched.source, Source::Cache);
            assert_eq!(fetched.data.unwrap()["body"], format!("[{}] hello", lang));
        }
    }

    #[tokio::test]
    async fn test_on_created_invalidates_collections() {
        let (repository, cache) = setup(WritePolicy::CacheAndInvalidateCollections);
        repository.insert(note(1, "first"));
        cache.fetch_collection(Some("en"), None).await.unwrap();

        let second = note(2, "second");
        repository.insert(second.clone());
        cache.on_created(&second).await.unwrap();

        let fetched = cache.fetch_collection(Some("en"), None).await.unwrap();
        assert_eq!(fetched.source, Source::Store);
        assert_eq!(fetched.data.len(), 2);
    }

    #[tokio::test]
    async fn test_cache_only_policy_leaves_collections() {
        let (repository, cache) = setup(WritePolicy::CacheOnly);
        repository.insert(note(1, "first"));
        cache.fetch_collection(Some("en"), None).await.unwrap();

        let second = note(2, "second");
        repository.insert(second.clone());
        cache.on_created(&second).await.unwrap();

        let fetched = cache.fetch_collection(Some("en"), None).await.unwrap();
        assert_eq!(fetched.source, Source::Cache);
        assert_eq!(fetched.data.len(), 1);
    }

    #[tokio::test]
    async fn test_on_created_invalidates_filtered_collections() {
        let (repository, cache) = setup(WritePolicy::default());
        let filters = Filters::new().any_of("body", ["one", "two"]);
        repository.insert(note(1, "one"));

        for lang in ["en", "ru"] {
            let first = cache.fetch_collection(Some(lang), Some(&filters)).await.unwrap();
            assert_eq!(first.data.len(), 1);
        }
        let cached = cache.fetch_collection(Some("en"), Some(&filters)).await.unwrap();
        assert_eq!(cached.source, Source::Cache);

        let second = note(2, "two");
        repository.insert(second.clone());
        cache.on_created(&second).await.unwrap();

        for lang in ["en", "ru"] {
            let fetched = cache.fetch_collection(Some(lang), Some(&filters)).await.unwrap();
            assert_eq!(fetched.source, Source::Store);
            assert_eq!(fetched.data.len(), 2);
        }
    }

    #[tokio::test]
    async fn test_on_deleted_invalidates_filtered_collections() {
        let (repository, cache) = setup(WritePolicy::CacheOnly);
        let filters = Filters::new().equals("body", "bye");
        let n = note(4, "bye");
        repository.insert(n.clone());
        cache.fetch_collection(Some("uz"), Some(&filters)).await.unwrap();

        repository.remove(&4);
        cache.on_deleted(&n).await.unwrap();

        let fetched = cache.fetch_collection(Some("uz"), Some(&filters)).await.unwrap();
        assert_eq!(fetched.source, Source::Store);
        assert!(fetched.data.is_empty());
    }

    #[tokio::test]
    async fn test_on_updated_refreshes_single_entries() {
        let (repository, cache) = setup(WritePolicy::default());
        repository.insert(note(3, "old"));
        cache.fetch_single(&3, Some("ru"), None).await.unwrap();

        let updated = note(3, "new");
        repository.update(updated.clone());
        cache.on_updated(&updated).await.unwrap();

        let fetched = cache.fetch_single(&3, Some("ru"), None).await.unwrap();
        assert_eq!(fetched.source, Source::Cache);
        assert_eq!(fetched.data.unwrap()["body"], "[ru] new");
    }

    #[tokio::test]
    async fn test_on_deleted_invalidates_six_keys() {
        let (repository, cache) = setup(WritePolicy::default());
        let n = note(7, "bye");
        repository.insert(n.clone());
        cache.on_created(&n).await.unwrap();
        cache.fetch_collection(Some("ru"), None).await.unwrap();

        let before = cache.stats().invalidations;
        repository.remove(&7);
        cache.on_deleted(&n).await.unwrap();

        assert_eq!(cache.stats().invalidations - before, 6);
        assert!(cache.store().is_empty().await);

        let fetched = cache.fetch_single(&7, Some("ru"), None).await.unwrap();
        assert_eq!(fetched.source, Source::Store);
        assert!(fetched.data.is_none());
    }

    #[test]
    fn test_write_policy_serde() {
        let policy: WritePolicy = serde_json::from_str("\"cache_only\"").unwrap();
        assert_eq!(policy, WritePolicy::CacheOnly);
        assert_eq!(
            serde_json::to_string(&WritePolicy::CacheAndInvalidateCollections).unwrap(),
            "\"cache_and_invalidate_collections\""
        );
    }
}
