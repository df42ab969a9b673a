//! Core business logic - framework-agnostic operations over a [`DocumentStore`].
//!
//! [`DocumentStore`]: crate::store::DocumentStore

/// Admin membership checks and grants
pub mod admin;
/// Managed collection names
pub mod collection;
/// Contact form submissions
pub mod contact;
/// Stateful front for initialization and stats
pub mod controller;
/// Idempotent collection seeding
pub mod initializer;
/// Bookings
pub mod order;
/// Customer reviews
pub mod review;
/// Services catalogue
pub mod service;
/// Session context derived from the store
pub mod session;
/// Site branding settings
pub mod settings;
/// Per-collection statistics
pub mod stats;

pub use collection::Collection;
pub use controller::{ActionResult, ControllerOptions, ControllerSnapshot, InitializationController};
pub use initializer::{InitOutcome, InitReport, InitStatus, initialize_all, initialize_collection};
pub use stats::{CollectionStats, StatsReport, get_collection_stats};
