//! In-process document store.
//!
//! Keeps collections in insertion order, counts every operation and can be
//! told to fail all calls touching a given collection. Used by the test suite
//! and by the CLI's `--memory` mode.

use super::{Document, DocumentStore, Fields};
use crate::errors::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::trace;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Collections {
    docs: BTreeMap<String, Vec<(String, Fields)>>,
    failures: HashMap<String, String>,
}

impl Collections {
    fn check(&self, collection: &str) -> Result<()> {
        match self.failures.get(collection) {
            Some(message) => Err(Error::store(message.clone())),
            None => Ok(()),
        }
    }
}

/// Thread-safe in-memory [`DocumentStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
    operations: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation on `collection` fail with `message`.
    pub async fn fail_collection(&self, collection: &str, message: &str) {
        self.inner
            .write()
            .await
            .failures
            .insert(collection.to_string(), message.to_string());
    }

    /// Removes a failure installed with [`MemoryStore::fail_collection`].
    pub async fn clear_failure(&self, collection: &str) {
        self.inner.write().await.failures.remove(collection);
    }

    /// Number of store operations issued so far, failed ones included.
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    fn count(&self, op: &str, collection: &str) {
        let n = self.operations.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(op, collection, n, "memory store operation");
    }
}

impl DocumentStore for MemoryStore {
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>> {
        self.count("list_all", collection);
        let inner = self.inner.read().await;
        inner.check(collection)?;
        Ok(inner
            .docs
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.count("get", collection);
        let inner = self.inner.read().await;
        inner.check(collection)?;
        Ok(inner.docs.get(collection).and_then(|docs| {
            docs.iter()
                .find(|(doc_id, _)| doc_id == id)
                .map(|(doc_id, fields)| Document {
                    id: doc_id.clone(),
                    fields: fields.clone(),
                })
        }))
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<String> {
        self.count("insert", collection);
        let mut inner = self.inner.write().await;
        inner.check(collection)?;
        let id = Uuid::new_v4().simple().to_string();
        inner
            .docs
            .entry(collection.to_string())
            .or_default()
            .push((id.clone(), fields));
        Ok(id)
    }

    async fn upsert(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        self.count("upsert", collection);
        let mut inner = self.inner.write().await;
        inner.check(collection)?;
        let docs = inner.docs.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|(doc_id, _)| doc_id == id) {
            Some((_, existing)) => *existing = fields,
            None => docs.push((id.to_string(), fields)),
        }
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        self.count("update", collection);
        let mut inner = self.inner.write().await;
        inner.check(collection)?;
        let existing = inner
            .docs
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|(doc_id, _)| doc_id == id))
            .ok_or_else(|| Error::DocumentNotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        existing.1.extend(fields);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.count("delete", collection);
        let mut inner = self.inner.write().await;
        inner.check(collection)?;
        if let Some(docs) = inner.docs.get_mut(collection) {
            docs.retain(|(doc_id, _)| doc_id != id);
        }
        Ok(())
    }

    async fn collection_names(&self) -> Result<Vec<String>> {
        self.count("collection_names", "*");
        Ok(self.inner.read().await.docs.keys().cloned().collect())
    }
}
