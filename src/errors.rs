//! Unified error types and result handling.

use thiserror::Error;

/// Every failure the crate can surface.
///
/// Store failures carry a readable message so that the initializer and the
/// stats reporter can turn them into outcome values without losing context.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Failure reported by a document store backend
    #[error("Store error: {message}")]
    Store {
        /// Human-readable failure message from the backend
        message: String,
    },

    /// Error coming straight from sea-orm
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A stored document could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Collection name outside the known set
    #[error("Unknown collection: {name}")]
    UnknownCollection {
        /// The rejected name
        name: String,
    },

    /// Lookup by id found nothing
    #[error("Document '{id}' not found in '{collection}'")]
    DocumentNotFound {
        /// Collection searched
        collection: String,
        /// Missing document id
        id: String,
    },

    /// Input rejected before reaching the store
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// The acting account may not perform the operation
    #[error("Permission restriction: {message}")]
    PermissionDenied {
        /// Why the action was refused
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Shorthand for a [`Error::Store`] with the given message.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// The message shown to users: the backend's own text for store errors,
    /// the full description otherwise.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Store { message } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
