//! Collection entity - Registry of collections that have been materialized.
//!
//! A collection stays registered after its last document is deleted, which is
//! what lets a write-then-delete placeholder leave an empty collection behind.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Collection registry model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "collections")]
pub struct Model {
    /// Collection name
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    /// When the first document was written to the collection
    pub created_at: DateTimeUtc,
}

/// `Collection` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
