//! Error types for empiredb-check

use empiredb::DbError;
use thiserror::Error;

/// Result type for empiredb-check operations.
pub type CheckResult<T> = Result<T, CheckError>;

/// Error type for empiredb-check operations.
///
/// Differences between the models are not errors; they are reported through a
/// [`ModelErrorHandler`](crate::handler::ModelErrorHandler).
#[derive(Debug, Error)]
pub enum CheckError {
    /// Reading the remote metadata failed.
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    /// The remote metadata is unusable (e.g., empty schema).
    #[error("Validation error: {0}")]
    Validation(String),
    /// Serialization of a report failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
