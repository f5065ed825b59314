//! Error types for the orchestration layer.

use thiserror::Error;

/// Errors surfaced by messaging operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The REST backend rejected or failed a request.
    #[error("api error: {0}")]
    Api(#[from] eventflow_api::Error),

    /// Local preference storage failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
