//! Document store gateway.
//!
//! All persistence goes through [`DocumentStore`]: a collection-scoped set of
//! CRUD operations over JSON documents. The store owns ids, durability and
//! per-document atomicity; nothing in this crate caches documents between
//! calls.

mod memory;
mod sea;

pub use memory::MemoryStore;
pub use sea::SeaOrmStore;

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::future::Future;

/// Raw document fields.
pub type Fields = serde_json::Map<String, Value>;

/// A document as returned by the store: its id plus raw fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned (or caller-chosen, for upserts) id
    pub id: String,
    /// Everything else
    #[serde(flatten)]
    pub fields: Fields,
}

impl Document {
    /// Deserializes the document into a typed record, exposing the store id
    /// as the record's `id` field.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let mut fields = self.fields.clone();
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

/// Serializes a record into document fields.
///
/// Fails when the value does not serialize to a JSON object.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        other => Err(Error::validation(format!(
            "documents must be JSON objects, got {other}"
        ))),
    }
}

/// Collection-scoped access to a remote document database.
///
/// Every method may fail with a store error carrying a readable message
/// (connectivity, permissions, quota). Callers decide whether that error is
/// propagated or converted into an outcome value.
pub trait DocumentStore: Send + Sync {
    /// Returns every document of `collection`, in the store's listing order.
    /// An unknown collection yields an empty list.
    fn list_all(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<Vec<Document>>> + Send;

    /// Fetches one document by id.
    fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<Option<Document>>> + Send;

    /// Inserts a new document and returns the id the store assigned to it.
    fn insert(
        &self,
        collection: &str,
        fields: Fields,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Creates or replaces the document stored under `id`.
    fn upsert(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Merges `fields` into an existing document.
    ///
    /// Fails with [`Error::DocumentNotFound`] when there is nothing to update.
    fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Deletes a document. Deleting a missing document is a no-op.
    fn delete(&self, collection: &str, id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Names of every collection that has ever received a document, including
    /// collections that are currently empty.
    fn collection_names(&self) -> impl Future<Output = Result<Vec<String>>> + Send;
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Admin {
        id: Option<String>,
        email: String,
    }

    #[test]
    fn test_decode_uses_store_id() {
        let doc = Document {
            id: "abc".to_string(),
            fields: json!({ "id": "stale", "email": "a@b.c" })
                .as_object()
                .unwrap()
                .clone(),
        };

        let admin: Admin = doc.decode().unwrap();
        assert_eq!(admin.id.as_deref(), Some("abc"));
        assert_eq!(admin.email, "a@b.c");
    }

    #[test]
    fn test_to_fields_rejects_non_objects() {
        assert!(to_fields(&42).is_err());
        let fields = to_fields(&json!({ "email": "x@y.z" })).unwrap();
        assert_eq!(fields["email"], "x@y.z");
    }

    #[test]
    fn test_document_serializes_flat() {
        let doc = Document {
            id: "1".to_string(),
            fields: to_fields(&json!({ "name": "Web Design" })).unwrap(),
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value, json!({ "id": "1", "name": "Web Design" }));
    }
}
