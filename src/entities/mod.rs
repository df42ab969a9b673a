//! Entity module - SeaORM entity definitions backing the document store.
//! Every collection shares the `documents` table; `collections` records which
//! collections have been materialized.

pub mod collection;
pub mod document;

pub use collection::{
    Column as CollectionColumn, Entity as CollectionEntry, Model as CollectionModel,
};
pub use document::{Column as DocumentColumn, Entity as Document, Model as DocumentModel};
