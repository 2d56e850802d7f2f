//! Record and Repository Contracts
//!
//! The persisted entity and the data-access seam the cache-aside layer reads
//! from on a miss.

use std::fmt::Display;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::filters::Filters;
use crate::lang::Lang;

// == Cacheable Record ==
/// A persisted entity that can be cached per language variant.
pub trait CacheableRecord: Send + Sync + 'static {
    /// Unique identifier type.
    ///
    /// The rendered id must not be `all` or start with `all_`: those keys
    /// coincide with collection keys, and building one panics in debug
    /// builds.
    type Id: Display + Send + Sync;

    /// Returns the record's identifier.
    fn id(&self) -> &Self::Id;

    /// Serializes the record for the given language variant.
    ///
    /// Records without translations ignore `lang`.
    fn to_payload(&self, lang: &Lang) -> Value;

    /// Lower-cased type name used as the default key prefix.
    ///
    /// Defaults to the last path segment of the Rust type name with any
    /// generic arguments removed.
    fn type_name() -> String {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base).to_lowercase()
    }
}

// == Record Repository ==
/// Data access for one record type.
#[async_trait]
pub trait RecordRepository<R: CacheableRecord>: Send + Sync {
    /// Looks up a record by id.
    async fn find_by_id(&self, id: &R::Id) -> Result<Option<R>>;

    /// Returns records passing `filters`, most recently created first.
    ///
    /// Scalar filters are equality tests, list filters are membership tests.
    async fn query_latest(&self, filters: &Filters) -> Result<Vec<R>>;
}
