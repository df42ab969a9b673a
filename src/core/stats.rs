//! Collection statistics.
//!
//! Read-only. Unlike initialization this is all-or-nothing: a failure while
//! reading any collection discards everything gathered so far.

use crate::{
    core::collection::Collection,
    errors::Result,
    store::{Document, DocumentStore},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{error, info};

/// What one collection currently holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    /// Whether the collection holds documents or has been materialized
    pub exists: bool,
    /// Number of documents
    pub document_count: usize,
    /// Every document with its id and raw fields
    pub documents: Vec<Document>,
}

/// Result of [`get_collection_stats`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum StatsReport {
    /// Every collection was read.
    Collected {
        /// Per-collection statistics
        stats: BTreeMap<Collection, CollectionStats>,
        /// When the report was taken
        timestamp: DateTime<Utc>,
    },
    /// A read failed; no partial statistics are kept.
    Failed {
        /// The store's failure message
        message: String,
        /// When the failure happened
        timestamp: DateTime<Utc>,
    },
}

impl StatsReport {
    /// True when statistics were collected.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self, Self::Collected { .. })
    }

    /// Statistics for one collection, if collected.
    #[must_use]
    pub fn get(&self, collection: Collection) -> Option<&CollectionStats> {
        match self {
            Self::Collected { stats, .. } => stats.get(&collection),
            Self::Failed { .. } => None,
        }
    }

    /// Failure message, if the report failed.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Collected { .. } => None,
            Self::Failed { message, .. } => Some(message),
        }
    }
}

/// Reads every managed collection, failing on the first error.
pub async fn collect_stats<S: DocumentStore>(
    store: &S,
) -> Result<BTreeMap<Collection, CollectionStats>> {
    let materialized = store.collection_names().await?;
    let mut stats = BTreeMap::new();

    for collection in Collection::ALL {
        let documents = store.list_all(collection.as_str()).await?;
        let known = materialized.iter().any(|name| name == collection.as_str());
        stats.insert(
            collection,
            CollectionStats {
                exists: known || !documents.is_empty(),
                document_count: documents.len(),
                documents,
            },
        );
    }
    Ok(stats)
}

/// Reports existence, document count and contents for each managed collection.
pub async fn get_collection_stats<S: DocumentStore>(store: &S) -> StatsReport {
    match collect_stats(store).await {
        Ok(stats) => {
            info!(
                "Collected stats for {} collections ({} documents)",
                stats.len(),
                stats.values().map(|s| s.document_count).sum::<usize>()
            );
            StatsReport::Collected {
                stats,
                timestamp: Utc::now(),
            }
        }
        Err(e) => {
            error!("Error getting collection stats: {}", e);
            StatsReport::Failed {
                message: e.user_message(),
                timestamp: Utc::now(),
            }
        }
    }
}
