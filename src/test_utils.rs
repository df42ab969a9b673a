//! Shared test utilities for `EasyConsulting`.
//!
//! Helpers for building stores, controllers and domain values with sensible
//! defaults.

use crate::{
    config::SeedCatalog,
    core::{
        ControllerOptions, InitializationController, initialize_all,
        service::{NewService, Service, create_service},
        session::User,
    },
    errors::Result,
    store::{DocumentStore, MemoryStore},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Routes tracing output through the test harness. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")))
        .with_test_writer()
        .try_init();
}

/// A memory store with every collection initialized from the default catalog.
pub async fn seeded_memory_store() -> MemoryStore {
    let store = MemoryStore::new();
    initialize_all(&store, &SeedCatalog::default()).await;
    store
}

/// A controller over a fresh memory store, plus a handle to that store.
pub fn memory_controller(
    options: ControllerOptions,
) -> (Arc<MemoryStore>, InitializationController<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let controller = InitializationController::new(Arc::clone(&store), SeedCatalog::default(), options);
    (store, controller)
}

/// Creates a test service.
///
/// # Defaults
/// * `price`: 100.0
/// * `description`: "Test service"
/// * `img`: empty
pub async fn create_test_service<S: DocumentStore>(store: &S, name: &str) -> Result<Service> {
    create_service(
        store,
        NewService {
            name: name.to_string(),
            price: 100.0,
            description: "Test service".to_string(),
            img: String::new(),
        },
    )
    .await
}

/// A signed-in user with a placeholder avatar.
pub fn test_user(email: &str) -> User {
    User {
        name: "Test User".to_string(),
        email: email.to_string(),
        img: Some(format!("https://example.com/avatars/{email}.png")),
    }
}
