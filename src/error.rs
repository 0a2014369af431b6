//! Error types for the search engine.
//!
//! `AppError` covers the operations exposed by the indexing service and the
//! search front door; internals use `anyhow` and surface here through the
//! transparent `Other` variant.

use thiserror::Error;

/// Domain-specific errors for engine operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid or malformed URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration file missing or malformed
    #[error("Config error: {0}")]
    ConfigError(String),

    /// URL does not belong to any configured site
    #[error("Page is outside the configured sites: {0}")]
    OutOfScope(String),

    /// A full reindex is already in progress
    #[error("Indexing is already running")]
    AlreadyIndexing,

    /// Stop requested while no reindex is in progress
    #[error("Indexing is not running")]
    NotIndexing,

    /// Generic error with context
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;
