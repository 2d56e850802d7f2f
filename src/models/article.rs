//! Article Record
//!
//! Sample record type served by the demo service. Its title is translated
//! per language variant.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::lang::Lang;
use crate::record::CacheableRecord;

/// A published article with a translated title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: u64,
    pub status: String,
    pub tag: String,
    /// Title keyed by language variant
    pub title: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl Article {
    /// Returns the title for `lang`, or None if it has no translation.
    pub fn title_for(&self, lang: &Lang) -> Option<&str> {
        self.title.get(lang.as_str()).map(String::as_str)
    }
}

impl CacheableRecord for Article {
    type Id = u64;

    fn id(&self) -> &u64 {
        &self.id
    }

    fn to_payload(&self, lang: &Lang) -> Value {
        json!({
            "id": self.id,
            "status": self.status,
            "tag": self.tag,
            "lang": lang,
            "title": self.title_for(lang),
            "created_at": self.created_at.to_rfc3339(),
        })
    }
}
