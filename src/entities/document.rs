//! Document entity - One JSON document inside a named collection.
//!
//! Documents are addressed by `(collection, doc_id)`. The payload is kept as a
//! JSON object so that every collection can share a single table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Document database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    /// Collection the document belongs to (e.g. "services")
    #[sea_orm(primary_key, auto_increment = false)]
    pub collection: String,
    /// Document id, unique within its collection
    #[sea_orm(primary_key, auto_increment = false)]
    pub doc_id: String,
    /// Raw document fields as a JSON object
    pub data: Json,
    /// When the document was first written
    pub created_at: DateTimeUtc,
    /// When the document was last written
    pub updated_at: DateTimeUtc,
}

/// Documents have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
