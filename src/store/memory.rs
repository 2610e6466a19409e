//! In-memory document store implementation (useful for testing).

use super::{merge_fields, DocumentStore, StoredDocument};
use crate::error::{Result, StemningError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

type Collection = BTreeMap<String, Value>;

/// In-memory document store.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error<E: std::fmt::Display>(e: E) -> StemningError {
    StemningError::Persistence(format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn upsert(&self, collection: &str, id: &str, body: &Value) -> Result<()> {
        let mut collections = self.collections.write().map_err(lock_error)?;
        let docs = collections.entry(collection.to_string()).or_default();

        let merged = match docs.remove(id) {
            Some(existing) => merge_fields(existing, body),
            None => body.clone(),
        };
        docs.insert(id.to_string(), merged);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let collections = self.collections.read().map_err(lock_error)?;
        Ok(collections.get(collection).and_then(|docs| docs.get(id)).cloned())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let mut collections = self.collections.write().map_err(lock_error)?;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };

        let removed = docs.remove(id).is_some();
        if docs.is_empty() {
            collections.remove(collection);
        }
        Ok(removed)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<StoredDocument>> {
        let collections = self.collections.read().map_err(lock_error)?;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, body)| StoredDocument {
                        id: id.clone(),
                        body: body.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let collections = self.collections.read().map_err(lock_error)?;
        let mut names: Vec<String> = collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
