//! Collection initialization.
//!
//! Each managed collection is seeded only when it holds no documents at all:
//! initialization never overwrites or duplicates existing data. Services and
//! admins receive the seed catalog; orders and reviews have no seed data and
//! are materialized by writing and immediately deleting a placeholder
//! document.
//!
//! Store failures are converted into [`InitOutcome::Error`] here and never
//! escape as `Err`. The existence check and the writes are separate calls, so
//! two clients initializing the same empty collection at once can both seed
//! it.

use crate::{
    config::SeedCatalog,
    core::collection::Collection,
    errors::Result,
    store::{DocumentStore, Fields, to_fields},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tracing::{debug, error, info, instrument};

/// Id of the throwaway document used to materialize empty collections.
pub const PLACEHOLDER_ID: &str = "__placeholder__";

/// Outcome of initializing one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum InitOutcome {
    /// The collection was empty and has been seeded or materialized.
    Created {
        /// Number of seed documents written; `None` for collections without seed data
        #[serde(skip_serializing_if = "Option::is_none")]
        count: Option<usize>,
    },
    /// The collection already held data; nothing was written.
    #[serde(rename = "exists")]
    AlreadyExists {
        /// `Some(0)` for collections that carry seed data, `None` otherwise
        #[serde(skip_serializing_if = "Option::is_none")]
        count: Option<usize>,
    },
    /// A store operation failed.
    Error {
        /// The store's failure message
        message: String,
    },
}

/// Status tag of an [`InitOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InitStatus {
    /// See [`InitOutcome::Created`]
    Created,
    /// See [`InitOutcome::AlreadyExists`]
    Exists,
    /// See [`InitOutcome::Error`]
    Error,
}

impl InitOutcome {
    /// Whether the collection is usable afterwards.
    #[must_use]
    pub const fn success(&self) -> bool {
        !matches!(self, Self::Error { .. })
    }

    /// The outcome's status tag.
    #[must_use]
    pub const fn status(&self) -> InitStatus {
        match self {
            Self::Created { .. } => InitStatus::Created,
            Self::AlreadyExists { .. } => InitStatus::Exists,
            Self::Error { .. } => InitStatus::Error,
        }
    }

    /// Seed documents written. Services report `Some(0)` when they already
    /// existed; placeholder collections and errors report `None`.
    #[must_use]
    pub const fn count(&self) -> Option<usize> {
        match self {
            Self::Created { count } | Self::AlreadyExists { count } => *count,
            Self::Error { .. } => None,
        }
    }

    /// User-facing description of this outcome for `collection`.
    #[must_use]
    pub fn message(&self, collection: Collection) -> String {
        let label = collection.label();
        match (self, collection) {
            (Self::AlreadyExists { .. }, _) => format!("{label} collection already exists"),
            (Self::Created { count: None }, _) => format!("{label} collection initialized"),
            (Self::Created { count: Some(n) }, Collection::Services) => {
                format!("{label} collection initialized with {n} services")
            }
            (Self::Created { count: Some(n) }, Collection::Admins) => {
                let plural = if *n > 1 { "s" } else { "" };
                format!("{label} collection initialized with {n} admin{plural}")
            }
            (Self::Created { count: Some(n) }, _) => {
                format!("{label} collection initialized with {n} documents")
            }
            (Self::Error { message }, _) => message.clone(),
        }
    }
}

/// Aggregated outcome of [`initialize_all`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitReport {
    /// Per-collection outcomes
    pub details: BTreeMap<Collection, InitOutcome>,
    /// When the batch finished
    pub timestamp: DateTime<Utc>,
}

impl InitReport {
    /// True only when every collection succeeded.
    #[must_use]
    pub fn success(&self) -> bool {
        self.details.values().all(InitOutcome::success)
    }

    /// Number of collections that were seeded or materialized.
    #[must_use]
    pub fn created(&self) -> usize {
        self.count_status(InitStatus::Created)
    }

    /// Number of collections that already held data.
    #[must_use]
    pub fn existing(&self) -> usize {
        self.count_status(InitStatus::Exists)
    }

    /// Collections whose initialization failed.
    #[must_use]
    pub fn failed(&self) -> Vec<Collection> {
        self.details
            .iter()
            .filter(|(_, outcome)| !outcome.success())
            .map(|(collection, _)| *collection)
            .collect()
    }

    /// Summary line for the whole batch.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Collections initialization complete. Created: {}, Already existed: {}",
            self.created(),
            self.existing()
        )
    }

    fn count_status(&self, status: InitStatus) -> usize {
        self.details
            .values()
            .filter(|outcome| outcome.status() == status)
            .count()
    }
}

/// Returns true when `collection` holds at least one document.
pub async fn collection_exists<S: DocumentStore>(store: &S, collection: &str) -> Result<bool> {
    Ok(!store.list_all(collection).await?.is_empty())
}

fn timestamp() -> Value {
    json!(Utc::now())
}

fn settle(collection: Collection, result: Result<InitOutcome>) -> InitOutcome {
    match result {
        Ok(outcome) => {
            info!("{}", outcome.message(collection));
            outcome
        }
        Err(e) => {
            error!("Error initializing {}: {}", collection, e);
            InitOutcome::Error {
                message: e.user_message(),
            }
        }
    }
}

async fn seed<S: DocumentStore>(
    store: &S,
    collection: Collection,
    records: Vec<Fields>,
) -> Result<InitOutcome> {
    if collection_exists(store, collection.as_str()).await? {
        // only services report a zero count when left alone
        let count = (collection == Collection::Services).then_some(0);
        return Ok(InitOutcome::AlreadyExists { count });
    }

    let mut added = 0;
    for fields in records {
        let id = store.insert(collection.as_str(), fields).await?;
        debug!("Seeded {}/{}", collection, id);
        added += 1;
    }
    Ok(InitOutcome::Created { count: Some(added) })
}

async fn materialize<S: DocumentStore>(store: &S, collection: Collection) -> Result<InitOutcome> {
    if collection_exists(store, collection.as_str()).await? {
        return Ok(InitOutcome::AlreadyExists { count: None });
    }

    let mut placeholder = Fields::new();
    placeholder.insert("placeholder".to_string(), Value::Bool(true));
    placeholder.insert("createdAt".to_string(), timestamp());

    store
        .upsert(collection.as_str(), PLACEHOLDER_ID, placeholder)
        .await?;
    store.delete(collection.as_str(), PLACEHOLDER_ID).await?;
    Ok(InitOutcome::Created { count: None })
}

fn service_records(catalog: &SeedCatalog) -> Result<Vec<Fields>> {
    catalog
        .services
        .iter()
        .map(|service| {
            let mut fields = to_fields(service)?;
            fields.insert("createdAt".to_string(), timestamp());
            fields.insert("updatedAt".to_string(), timestamp());
            Ok(fields)
        })
        .collect()
}

fn admin_records(catalog: &SeedCatalog) -> Result<Vec<Fields>> {
    catalog
        .admins
        .iter()
        .map(|admin| {
            let mut fields = to_fields(admin)?;
            fields.insert("createdAt".to_string(), timestamp());
            Ok(fields)
        })
        .collect()
}

/// Seeds `services` with the catalog's services if it is empty.
#[instrument(skip_all)]
pub async fn initialize_services<S: DocumentStore>(store: &S, catalog: &SeedCatalog) -> InitOutcome {
    let result = match service_records(catalog) {
        Ok(records) => seed(store, Collection::Services, records).await,
        Err(e) => Err(e),
    };
    settle(Collection::Services, result)
}

/// Materializes `orders` if it is empty.
#[instrument(skip_all)]
pub async fn initialize_orders<S: DocumentStore>(store: &S) -> InitOutcome {
    settle(
        Collection::Orders,
        materialize(store, Collection::Orders).await,
    )
}

/// Materializes `reviews` if it is empty.
#[instrument(skip_all)]
pub async fn initialize_reviews<S: DocumentStore>(store: &S) -> InitOutcome {
    settle(
        Collection::Reviews,
        materialize(store, Collection::Reviews).await,
    )
}

/// Seeds `admins` with the catalog's admin emails if it is empty.
#[instrument(skip_all)]
pub async fn initialize_admins<S: DocumentStore>(store: &S, catalog: &SeedCatalog) -> InitOutcome {
    let result = match admin_records(catalog) {
        Ok(records) => seed(store, Collection::Admins, records).await,
        Err(e) => Err(e),
    };
    settle(Collection::Admins, result)
}

/// Initializes a single collection.
pub async fn initialize_collection<S: DocumentStore>(
    store: &S,
    catalog: &SeedCatalog,
    collection: Collection,
) -> InitOutcome {
    match collection {
        Collection::Services => initialize_services(store, catalog).await,
        Collection::Orders => initialize_orders(store).await,
        Collection::Reviews => initialize_reviews(store).await,
        Collection::Admins => initialize_admins(store, catalog).await,
    }
}

/// Initializes all four collections one after another.
///
/// Every collection is attempted even when an earlier one fails; nothing is
/// rolled back. Inspect [`InitReport::details`] to see what actually happened.
pub async fn initialize_all<S: DocumentStore>(store: &S, catalog: &SeedCatalog) -> InitReport {
    let mut details = BTreeMap::new();
    for collection in Collection::ALL {
        let outcome = initialize_collection(store, catalog, collection).await;
        details.insert(collection, outcome);
    }

    let report = InitReport {
        details,
        timestamp: Utc::now(),
    };
    info!("{}", report.message());
    report
}
