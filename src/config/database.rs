//! Database configuration module.
//!
//! Handles `SQLite` connection setup and table creation using `SeaORM`. Tables
//! are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs.

use crate::entities::{CollectionEntry, Document};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::info;

/// Default database location when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/easy_consulting.sqlite?mode=rwc";

/// Gets the database URL from the environment or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Opens a connection to `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    info!("Connecting to document database at {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates the `documents` and `collections` tables if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut document_table = schema.create_table_from_entity(Document);
    let mut collection_table = schema.create_table_from_entity(CollectionEntry);

    document_table.if_not_exists();
    collection_table.if_not_exists();

    db.execute(builder.build(&document_table)).await?;
    db.execute(builder.build(&collection_table)).await?;

    Ok(())
}
