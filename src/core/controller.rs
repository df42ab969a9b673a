//! Initialization controller.
//!
//! Wraps the initializer and the stats reporter for presentation code: it
//! exposes observable loading/error/result/stats state and four triggers.
//! Every trigger raises the loading flag and clears the previous error, runs,
//! then either stores its result or records the error message.
//!
//! Triggers are not coordinated with each other. Starting one while another
//! is in flight is allowed: whichever resolves last owns the `result` slot,
//! and the first to resolve lowers `is_loading` even if another is still
//! running. Nothing is cancelled or queued.

use crate::{
    config::SeedCatalog,
    core::{
        collection::Collection,
        initializer::{self, InitOutcome, InitReport},
        stats::{self, StatsReport},
    },
    errors::Result,
    store::DocumentStore,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Behaviour switches for [`InitializationController`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Run [`InitializationController::initialize_all`] on mount
    pub auto_initialize: bool,
    /// Refresh stats after a fully successful `initialize_all`
    pub fetch_stats_after_init: bool,
}

/// Result returned by every trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", content = "result", rename_all = "camelCase")]
pub enum ActionResult {
    /// `initialize_all` finished
    All(InitReport),
    /// `initialize_collection` finished
    Collection {
        /// The collection initialized
        collection: Collection,
        /// What happened to it
        outcome: InitOutcome,
    },
    /// `check_collection` finished
    Check {
        /// The collection name checked
        collection: String,
        /// Whether it holds documents
        exists: bool,
    },
    /// `fetch_stats` finished
    Stats(StatsReport),
    /// The trigger failed before producing a result
    Failed {
        /// Why
        message: String,
    },
}

impl ActionResult {
    /// Whether the action achieved what it was asked to.
    #[must_use]
    pub fn success(&self) -> bool {
        match self {
            Self::All(report) => report.success(),
            Self::Collection { outcome, .. } => outcome.success(),
            Self::Check { .. } => true,
            Self::Stats(report) => report.success(),
            Self::Failed { .. } => false,
        }
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::All(report) => report.message(),
            Self::Collection {
                collection,
                outcome,
            } => outcome.message(*collection),
            Self::Check {
                collection,
                exists: true,
            } => format!("Collection '{collection}' exists"),
            Self::Check { collection, .. } => format!("Collection '{collection}' has no documents"),
            Self::Stats(report) => report
                .error_message()
                .map_or_else(|| "Collection statistics collected".to_string(), str::to_string),
            Self::Failed { message } => message.clone(),
        }
    }
}

/// Observable controller state at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerSnapshot {
    /// A trigger is running
    pub is_loading: bool,
    /// Message of the last failed trigger, cleared when a new one starts
    pub error: Option<String>,
    /// Result of the last successful trigger
    pub result: Option<ActionResult>,
    /// Last stats report
    pub stats: Option<StatsReport>,
}

/// Stateful front for collection initialization.
pub struct InitializationController<S> {
    store: Arc<S>,
    catalog: Arc<SeedCatalog>,
    options: ControllerOptions,
    state: Arc<RwLock<ControllerSnapshot>>,
}

impl<S> Clone for InitializationController<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            catalog: Arc::clone(&self.catalog),
            options: self.options,
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: DocumentStore> InitializationController<S> {
    /// Creates an idle controller.
    pub fn new(store: Arc<S>, catalog: SeedCatalog, options: ControllerOptions) -> Self {
        Self {
            store,
            catalog: Arc::new(catalog),
            options,
            state: Arc::new(RwLock::new(ControllerSnapshot::default())),
        }
    }

    /// Creates a controller and, when `auto_initialize` is set, runs
    /// [`Self::initialize_all`] before returning it.
    pub async fn mount(store: Arc<S>, catalog: SeedCatalog, options: ControllerOptions) -> Self {
        let controller = Self::new(store, catalog, options);
        if options.auto_initialize {
            info!("Auto-initializing collections");
            controller.initialize_all().await;
        }
        controller
    }

    /// Current state.
    pub async fn snapshot(&self) -> ControllerSnapshot {
        self.state.read().await.clone()
    }

    async fn begin(&self) {
        let mut state = self.state.write().await;
        state.is_loading = true;
        state.error = None;
    }

    async fn finish(&self, outcome: Result<ActionResult>) -> ActionResult {
        let mut state = self.state.write().await;
        state.is_loading = false;
        match outcome {
            Ok(result) => {
                state.result = Some(result.clone());
                result
            }
            Err(e) => {
                let message = e.user_message();
                warn!("Initialization action failed: {}", message);
                state.error = Some(message.clone());
                ActionResult::Failed { message }
            }
        }
    }

    /// Initializes all four collections.
    pub async fn initialize_all(&self) -> ActionResult {
        self.begin().await;
        let report = initializer::initialize_all(self.store.as_ref(), &self.catalog).await;

        if self.options.fetch_stats_after_init && report.success() {
            let stats = stats::get_collection_stats(self.store.as_ref()).await;
            self.state.write().await.stats = Some(stats);
        }

        self.finish(Ok(ActionResult::All(report))).await
    }

    /// Initializes one collection by name. Unknown names fail without
    /// touching the store.
    pub async fn initialize_collection(&self, name: &str) -> ActionResult {
        self.begin().await;
        let outcome = match name.parse::<Collection>() {
            Ok(collection) => Ok(ActionResult::Collection {
                collection,
                outcome: initializer::initialize_collection(
                    self.store.as_ref(),
                    &self.catalog,
                    collection,
                )
                .await,
            }),
            Err(e) => Err(e),
        };
        self.finish(outcome).await
    }

    /// Reports whether a collection holds any documents.
    pub async fn check_collection(&self, name: &str) -> ActionResult {
        self.begin().await;
        let outcome = initializer::collection_exists(self.store.as_ref(), name)
            .await
            .map(|exists| ActionResult::Check {
                collection: name.to_string(),
                exists,
            });
        self.finish(outcome).await
    }

    /// Collects statistics for all managed collections.
    pub async fn fetch_stats(&self) -> ActionResult {
        self.begin().await;
        let report = stats::get_collection_stats(self.store.as_ref()).await;
        self.state.write().await.stats = Some(report.clone());
        self.finish(Ok(ActionResult::Stats(report))).await
    }
}
