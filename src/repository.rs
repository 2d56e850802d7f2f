//! Memory Repository Module
//!
//! In-process `RecordRepository` that keeps records in creation order.
//! Its mutation methods stand in for the application's persistence layer.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::filters::Filters;
use crate::record::{CacheableRecord, RecordRepository};

// == Memory Repository ==
/// Records held in memory, oldest first.
#[derive(Debug)]
pub struct MemoryRepository<R> {
    records: RwLock<Vec<R>>,
}

impl<R> Default for MemoryRepository<R> {
    fn default() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl<R> MemoryRepository<R>
where
    R: CacheableRecord + Clone,
    R::Id: PartialEq,
{
    pub fn new() -> Self {
        Self::default()
    }

    // == Insert ==
    /// Appends a record as the most recently created one.
    pub fn insert(&self, record: R) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    // == Update ==
    /// Replaces the record with the same id, keeping its creation position.
    ///
    /// Returns false if no such record exists.
    pub fn update(&self, record: R) -> bool {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        match records.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    // == Remove ==
    /// Removes and returns the record with `id`.
    pub fn remove(&self, id: &R::Id) -> Option<R> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let index = records.iter().position(|r| r.id() == id)?;
        Some(records.remove(index))
    }

    /// Returns a copy of the record with `id`.
    pub fn get(&self, id: &R::Id) -> Option<R> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.iter().find(|r| r.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<R> RecordRepository<R> for MemoryRepository<R>
where
    R: CacheableRecord + Clone + Serialize,
    R::Id: PartialEq,
{
    async fn find_by_id(&self, id: &R::Id) -> Result<Option<R>> {
        Ok(self.get(id))
    }

    async fn query_latest(&self, filters: &Filters) -> Result<Vec<R>> {
        let snapshot: Vec<R> = self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut matched = Vec::new();
        for record in snapshot.into_iter().rev() {
            if filters.is_empty() || filters.matches(&serde_json::to_value(&record)?) {
                matched.push(record);
            }
        }
        Ok(matched)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Lang;
    use serde_json::{json, Value};

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Item {
        id: u32,
        kind: String,
    }

    impl CacheableRecord for Item {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }

        fn to_payload(&self, _lang: &Lang) -> Value {
            json!({ "id": self.id, "kind": self.kind })
        }
    }

    fn item(id: u32, kind: &str) -> Item {
        Item {
            id,
            kind: kind.to_string(),
        }
    }

    fn seeded() -> MemoryRepository<Item> {
        let repo = MemoryRepository::new();
        repo.insert(item(1, "a"));
        repo.insert(item(2, "b"));
        repo.insert(item(3, "a"));
        repo
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let repo = seeded();
        assert_eq!(repo.find_by_id(&2).await.unwrap(), Some(item(2, "b")));
        assert_eq!(repo.find_by_id(&9).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_query_latest_newest_first() {
        let repo = seeded();
        let ids: Vec<u32> = repo
            .query_latest(&Filters::new())
            .await
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_query_latest_filtered() {
        let repo = seeded();
        let found = repo
            .query_latest(&Filters::new().equals("kind", "a"))
            .await
            .unwrap();
        assert_eq!(found, vec![item(3, "a"), item(1, "a")]);

        let found = repo
            .query_latest(&Filters::new().any_of("id", [1, 2]))
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_update_keeps_position() {
        let repo = seeded();
        assert!(repo.update(item(1, "z")));
        assert!(!repo.update(item(9, "z")));
        assert_eq!(repo.get(&1), Some(item(1, "z")));
        assert_eq!(repo.len(), 3);
    }

    #[test]
    fn test_remove() {
        let repo = seeded();
        assert_eq!(repo.remove(&2), Some(item(2, "b")));
        assert_eq!(repo.remove(&2), None);
        assert_eq!(repo.len(), 2);
        assert!(!repo.is_empty());
    }
}
