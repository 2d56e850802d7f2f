//! Cache Key Construction
//!
//! Deterministic keys for single records and filtered collections.
//!
//! Key shapes:
//! - single record: `{prefix}_{id}_{lang}`
//! - collection: `{prefix}_all_{lang}`
//! - filtered collection: `{prefix}_all_{params}_{lang}`
//! - index of filtered collection keys: `{prefix}_all_keys_{lang}`
//!
//! Ids rendering as `all` or starting with `all_` would land in the
//! collection key space and are rejected in debug builds.

use sha2::{Digest, Sha256};

use crate::filters::Filters;
use crate::lang::Lang;

/// Parameter segments longer than this many characters are replaced by
/// their SHA-256 hex digest.
pub const MAX_PARAM_LENGTH: usize = 100;

// == Key Builder ==
/// Builds cache keys for one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBuilder {
    prefix: String,
}

impl KeyBuilder {
    /// Creates a builder for the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    // == Build ==
    /// Builds the key for a request.
    ///
    /// An empty `id` counts as absent. When an id is present the filters are
    /// ignored, so single-record keys never depend on them.
    pub fn build(&self, id: Option<&str>, lang: &Lang, params: Option<&Filters>) -> String {
        if let Some(id) = id.filter(|id| !id.is_empty()) {
            return self.single(id, lang);
        }

        match params.filter(|p| !p.is_empty()) {
            Some(params) => format!(
                "{}_all_{}_{}",
                self.prefix,
                bounded_param_string(params),
                lang
            ),
            None => format!("{}_all_{}", self.prefix, lang),
        }
    }

    /// Key of a single record.
    pub fn single(&self, id: &str, lang: &Lang) -> String {
        debug_assert!(
            !is_reserved_id(id),
            "record id {:?} collides with the collection key space",
            id
        );
        format!("{}_{}_{}", self.prefix, id, lang)
    }

    /// Key of an unfiltered collection.
    pub fn collection(&self, lang: &Lang) -> String {
        self.build(None, lang, None)
    }

    /// Key of the entry listing the cached filtered collections of `lang`.
    ///
    /// A parameter string always contains `_`, so no filtered collection
    /// key can take this shape.
    pub fn index(&self, lang: &Lang) -> String {
        format!("{}_all_keys_{}", self.prefix, lang)
    }
}

/// Returns true for ids whose single-record key would look like a
/// collection key.
pub fn is_reserved_id(id: &str) -> bool {
    id == "all" || id.starts_with("all_")
}

/// Returns the parameter segment, hashed when it exceeds `MAX_PARAM_LENGTH`.
pub fn bounded_param_string(params: &Filters) -> String {
    let raw = params.param_string();
    if raw.chars().count() > MAX_PARAM_LENGTH {
        hex::encode(Sha256::digest(raw.as_bytes()))
    } else {
        raw
    }
}
