//! SQL-backed document store.
//!
//! Stores every collection in the `documents` table through `SeaORM`, keyed by
//! `(collection, doc_id)` with the fields serialized as JSON. The
//! `collections` table records which collections have been materialized.
//!
//! Writes that may collide with a concurrent writer are single
//! `INSERT .. ON CONFLICT` statements, never a lookup followed by an insert.

use super::{Document, DocumentStore, Fields};
use crate::{
    entities::{CollectionEntry, collection, document},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::OnConflict};
use serde_json::Value;
use tracing::{debug, instrument};
use uuid::Uuid;

/// [`DocumentStore`] over a `SeaORM` connection.
#[derive(Debug, Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    /// Wraps an open connection. Tables must already exist, see
    /// [`crate::config::database::create_tables`].
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn register_collection(&self, name: &str) -> Result<()> {
        let entry = collection::ActiveModel {
            name: Set(name.to_string()),
            created_at: Set(Utc::now()),
        };
        let inserted = CollectionEntry::insert(entry)
            .on_conflict(
                OnConflict::column(collection::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        if inserted > 0 {
            debug!("Materialized collection '{}'", name);
        }
        Ok(())
    }

    async fn find(&self, collection: &str, id: &str) -> Result<Option<document::Model>> {
        document::Entity::find_by_id((collection.to_string(), id.to_string()))
            .one(&self.db)
            .await
            .map_err(Into::into)
    }
}

fn into_document(model: document::Model) -> Result<Document> {
    match model.data {
        Value::Object(fields) => Ok(Document {
            id: model.doc_id,
            fields,
        }),
        other => Err(Error::store(format!(
            "document '{}/{}' holds {other} instead of an object",
            model.collection, model.doc_id
        ))),
    }
}

impl DocumentStore for SeaOrmStore {
    #[instrument(skip(self))]
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>> {
        document::Entity::find()
            .filter(document::Column::Collection.eq(collection))
            .order_by_asc(document::Column::CreatedAt)
            .order_by_asc(document::Column::DocId)
            .all(&self.db)
            .await?
            .into_iter()
            .map(into_document)
            .collect()
    }

    #[instrument(skip(self))]
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.find(collection, id).await?.map(into_document).transpose()
    }

    #[instrument(skip(self, fields))]
    async fn insert(&self, collection: &str, fields: Fields) -> Result<String> {
        self.register_collection(collection).await?;
        let id = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        document::ActiveModel {
            collection: Set(collection.to_string()),
            doc_id: Set(id.clone()),
            data: Set(Value::Object(fields)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;
        Ok(id)
    }

    #[instrument(skip(self, fields))]
    async fn upsert(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        self.register_collection(collection).await?;
        let now = Utc::now();
        let doc = document::ActiveModel {
            collection: Set(collection.to_string()),
            doc_id: Set(id.to_string()),
            data: Set(Value::Object(fields)),
            created_at: Set(now),
            updated_at: Set(now),
        };
        // keeps the original created_at when replacing
        document::Entity::insert(doc)
            .on_conflict(
                OnConflict::columns([document::Column::Collection, document::Column::DocId])
                    .update_columns([document::Column::Data, document::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, fields))]
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        let existing = self
            .find(collection, id)
            .await?
            .ok_or_else(|| Error::DocumentNotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        let mut merged = match &existing.data {
            Value::Object(current) => current.clone(),
            _ => Fields::new(),
        };
        merged.extend(fields);

        let mut active: document::ActiveModel = existing.into();
        active.data = Set(Value::Object(merged));
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        document::Entity::delete_by_id((collection.to_string(), id.to_string()))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn collection_names(&self) -> Result<Vec<String>> {
        Ok(CollectionEntry::find()
            .order_by_asc(collection::Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|entry| entry.name)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::store::to_fields;
    use crate::test_utils::setup_test_db;
    use serde_json::json;

    async fn store() -> Result<SeaOrmStore> {
        Ok(SeaOrmStore::new(setup_test_db().await?))
    }

    #[tokio::test]
    async fn test_insert_and_list() -> Result<()> {
        let store = store().await?;
        let id = store
            .insert("services", to_fields(&json!({ "name": "Web Design", "price": 500 }))?)
            .await?;

        let docs = store.list_all("services").await?;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, id);
        assert_eq!(docs[0].fields["price"], 500);
        assert!(store.list_all("orders").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_collections_are_scoped() -> Result<()> {
        let store = store().await?;
        store.upsert("settings", "same", to_fields(&json!({ "value": 1 }))?).await?;
        store.upsert("orders", "same", to_fields(&json!({ "value": 2 }))?).await?;

        let setting = store.get("settings", "same").await?.unwrap();
        let order = store.get("orders", "same").await?.unwrap();
        assert_eq!(setting.fields["value"], 1);
        assert_eq!(order.fields["value"], 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_replaces_whole_document() -> Result<()> {
        let store = store().await?;
        store
            .upsert("settings", "siteName", to_fields(&json!({ "value": "A", "type": "text" }))?)
            .await?;
        store
            .upsert("settings", "siteName", to_fields(&json!({ "value": "B" }))?)
            .await?;

        let doc = store.get("settings", "siteName").await?.unwrap();
        assert_eq!(doc.fields["value"], "B");
        assert!(!doc.fields.contains_key("type"));
        assert_eq!(store.list_all("settings").await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_merges_fields() -> Result<()> {
        let store = store().await?;
        let id = store
            .insert("reviews", to_fields(&json!({ "name": "Ann", "address": "Here" }))?)
            .await?;
        store
            .update("reviews", &id, to_fields(&json!({ "address": "There" }))?)
            .await?;

        let doc = store.get("reviews", &id).await?.unwrap();
        assert_eq!(doc.fields["name"], "Ann");
        assert_eq!(doc.fields["address"], "There");

        let missing = store.update("reviews", "missing", Fields::new()).await;
        assert!(matches!(missing, Err(Error::DocumentNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_inserts_into_new_collection() -> Result<()> {
        let store = store().await?;
        let (a, b) = tokio::join!(
            store.insert("contacts", to_fields(&json!({ "name": "Ann" }))?),
            store.insert("contacts", to_fields(&json!({ "name": "Bob" }))?),
        );
        assert_ne!(a?, b?);

        assert_eq!(store.list_all("contacts").await?.len(), 2);
        assert_eq!(store.collection_names().await?, vec!["contacts".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_upserts_last_writer_wins() -> Result<()> {
        let store = store().await?;
        let (a, b) = tokio::join!(
            store.upsert("settings", "siteName", to_fields(&json!({ "value": "A" }))?),
            store.upsert("settings", "siteName", to_fields(&json!({ "value": "B" }))?),
        );
        a?;
        b?;

        let docs = store.list_all("settings").await?;
        assert_eq!(docs.len(), 1);
        let value = docs[0].fields["value"].as_str().unwrap();
        assert!(value == "A" || value == "B");
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_keeps_created_at() -> Result<()> {
        let store = store().await?;
        store.upsert("settings", "favicon", to_fields(&json!({ "value": "a" }))?).await?;
        let first = store.find("settings", "favicon").await?.unwrap();
        store.upsert("settings", "favicon", to_fields(&json!({ "value": "b" }))?).await?;
        let second = store.find("settings", "favicon").await?.unwrap();

        assert_eq!(first.created_at, second.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(second.data, json!({ "value": "b" }));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_keeps_collection_registered() -> Result<()> {
        let store = store().await?;
        store.upsert("orders", "__placeholder__", Fields::new()).await?;
        store.delete("orders", "__placeholder__").await?;
        // deleting twice is fine
        store.delete("orders", "__placeholder__").await?;

        assert!(store.get("orders", "__placeholder__").await?.is_none());
        assert_eq!(store.collection_names().await?, vec!["orders".to_string()]);
        Ok(())
    }
}
