//! Cache-Aside Module
//!
//! Read-through caching of single records and filtered collections, with
//! explicit write and invalidation operations for use after mutations.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheStats, KeyValueStore, StatsRecorder};
use crate::config::CacheSettings;
use crate::error::Result;
use crate::filters::Filters;
use crate::key::KeyBuilder;
use crate::lang::Lang;
use crate::record::{CacheableRecord, RecordRepository};

// == Source ==
/// Where a read was served from.
///
/// Reflects whether the key was present *before* the read-through ran, not
/// whether this call populated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Store,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Cache => write!(f, "cache"),
            Source::Store => write!(f, "store"),
        }
    }
}

// == Fetched ==
/// Read result tagged with its source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched<T> {
    pub source: Source,
    pub data: T,
}

// == Cache Aside ==
/// Cache-aside layer for one record type.
///
/// # Type Parameters
/// - `R`: the cached record type
/// - `P`: the repository consulted on a miss
/// - `S`: the key-value store holding serialized payloads
pub struct CacheAside<R, P, S> {
    repository: Arc<P>,
    store: Arc<S>,
    settings: CacheSettings,
    keys: KeyBuilder,
    stats: StatsRecorder,
    _record: PhantomData<fn() -> R>,
}

impl<R, P, S> CacheAside<R, P, S>
where
    R: CacheableRecord,
    P: RecordRepository<R>,
    S: KeyValueStore,
{
    // == Constructor ==
    /// Creates the layer.
    ///
    /// The key prefix is `settings.prefix` when set, otherwise the record's
    /// lower-cased type name.
    pub fn new(repository: Arc<P>, store: Arc<S>, settings: CacheSettings) -> Self {
        let prefix = settings
            .prefix
            .clone()
            .unwrap_or_else(|| R::type_name().to_lowercase());

        Self {
            repository,
            store,
            settings,
            keys: KeyBuilder::new(prefix),
            stats: StatsRecorder::new(),
            _record: PhantomData,
        }
    }

    /// Creates the layer with default settings.
    pub fn with_defaults(repository: Arc<P>, store: Arc<S>) -> Self {
        Self::new(repository, store, CacheSettings::default())
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Prefix every key of this layer starts with.
    pub fn key_prefix(&self) -> &str {
        self.keys.prefix()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a snapshot of the read/write counters.
    ///
    /// Hits and misses count whether a cached payload was actually read, which
    /// can differ from the reported `Source` when an entry expires between the
    /// existence check and the read.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    // == Validate Lang ==
    /// Normalizes a language selector; unknown or absent input yields the
    /// configured default.
    pub fn validate_lang(&self, input: Option<&str>) -> Lang {
        self.settings.languages.resolve(input)
    }

    // == Build Key ==
    /// Builds the cache key for a request.
    pub fn build_key(
        &self,
        id: Option<&R::Id>,
        lang: Option<&str>,
        params: Option<&Filters>,
    ) -> String {
        let lang = self.validate_lang(lang);
        let id = id.map(ToString::to_string);
        self.keys.build(id.as_deref(), &lang, params)
    }

    // == Fetch Collection ==
    /// Reads the latest records matching `params`, through the cache.
    ///
    /// On a miss the repository result is serialized for `lang` and cached
    /// with the configured TTL. Filtered keys are also recorded in the
    /// per-language index so that writes can drop them later.
    pub async fn fetch_collection(
        &self,
        lang: Option<&str>,
        params: Option<&Filters>,
    ) -> Result<Fetched<Vec<Value>>> {
        let lang = self.validate_lang(lang);
        let key = self.keys.build(None, &lang, params);
        let source = self.source_of(&key).await?;

        if let Some(payload) = self.cached(&key).await? {
            debug!(key = %key, source = %source, "collection served from cache");
            let data = serde_json::from_str(&payload)?;
            return Ok(Fetched { source, data });
        }

        let empty = Filters::new();
        let records = self
            .repository
            .query_latest(params.unwrap_or(&empty))
            .await?;
        let data: Vec<Value> = records.iter().map(|r| r.to_payload(&lang)).collect();

        self.write(&key, &data).await?;
        if params.is_some_and(|p| !p.is_empty()) {
            self.track(&lang, &key).await?;
        }
        debug!(key = %key, source = %source, count = data.len(), "collection loaded from repository");

        Ok(Fetched { source, data })
    }

    // == Fetch Single ==
    /// Reads one record by id, through the cache.
    ///
    /// A missing record yields `data: None` and is not cached, so the next
    /// call queries the repository again.
    pub async fn fetch_single(
        &self,
        id: &R::Id,
        lang: Option<&str>,
        params: Option<&Filters>,
    ) -> Result<Fetched<Option<Value>>> {
        let lang = self.validate_lang(lang);
        let id_str = id.to_string();
        let key = self.keys.build(Some(&id_str), &lang, params);
        let source = self.source_of(&key).await?;

        if let Some(payload) = self.cached(&key).await? {
            debug!(key = %key, source = %source, "record served from cache");
            let data = serde_json::from_str(&payload)?;
            return Ok(Fetched { source, data });
        }

        let data = match self.repository.find_by_id(id).await? {
            Some(record) => {
                let payload = record.to_payload(&lang);
                self.write(&key, &payload).await?;
                debug!(key = %key, source = %source, "record loaded from repository");
                Some(payload)
            }
            None => {
                debug!(key = %key, "record not found");
                None
            }
        };

        Ok(Fetched { source, data })
    }

    // == Cache Single ==
    /// Writes `record`'s serialized form for `lang`, replacing any entry.
    pub async fn cache_single(
        &self,
        record: &R,
        lang: Option<&str>,
        params: Option<&Filters>,
    ) -> Result<()> {
        let lang = self.validate_lang(lang);
        let id = record.id().to_string();
        let key = self.keys.build(Some(&id), &lang, params);

        self.write(&key, &record.to_payload(&lang)).await?;
        debug!(key = %key, "record cached");
        Ok(())
    }

    // == Invalidate ==
    /// Deletes the single-record and collection keys of every supported
    /// language variant.
    pub async fn invalidate(&self, record: &R, params: Option<&Filters>) -> Result<()> {
        let id = record.id().to_string();
        for lang in self.settings.languages.iter() {
            self.forget(&self.keys.build(Some(&id), lang, params)).await?;
            self.forget(&self.keys.build(None, lang, params)).await?;
        }
        Ok(())
    }

    /// Deletes every collection key of every supported language variant:
    /// the unfiltered one and all tracked filtered ones.
    pub async fn invalidate_all_collections(&self) -> Result<()> {
        for lang in self.settings.languages.iter() {
            self.forget(&self.keys.collection(lang)).await?;
        }
        self.invalidate_filtered_collections().await
    }

    /// Deletes the tracked filtered collection keys of every supported
    /// language variant, along with their index entries.
    pub async fn invalidate_filtered_collections(&self) -> Result<()> {
        for lang in self.settings.languages.iter() {
            let index = self.keys.index(lang);
            for key in self.tracked(&index).await? {
                self.forget(&key).await?;
            }
            self.store.delete(&index).await?;
        }
        Ok(())
    }

    // == Internals ==
    async fn source_of(&self, key: &str) -> Result<Source> {
        let source = if self.store.exists(key).await? {
            Source::Cache
        } else {
            Source::Store
        };
        Ok(source)
    }

    async fn cached(&self, key: &str) -> Result<Option<String>> {
        let payload = self.store.get(key).await?;
        if payload.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        Ok(payload)
    }

    async fn tracked(&self, index: &str) -> Result<Vec<String>> {
        match self.store.get(index).await? {
            Some(encoded) => Ok(serde_json::from_str(&encoded)?),
            None => Ok(Vec::new()),
        }
    }

    /// Adds a filtered collection key to the index of `lang`.
    ///
    /// The index is rewritten with the same TTL on every call, so it never
    /// expires before a key it lists. Concurrent writers can drop each
    /// other's additions.
    async fn track(&self, lang: &Lang, key: &str) -> Result<()> {
        let index = self.keys.index(lang);
        let mut keys = self.tracked(&index).await?;
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
        let encoded = serde_json::to_string(&keys)?;
        self.store.set(&index, encoded, self.settings.ttl).await
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, payload: &T) -> Result<()> {
        let encoded = serde_json::to_string(payload)?;
        self.store.set(key, encoded, self.settings.ttl).await?;
        self.stats.record_write();
        Ok(())
    }

    async fn forget(&self, key: &str) -> Result<()> {
        self.store.delete(key).await?;
        self.stats.record_invalidation();
        debug!(key = %key, "cache key invalidated");
        Ok(())
    }
}
