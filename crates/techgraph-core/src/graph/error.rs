//! Graph backend error types.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised by a graph backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection, transport or session failure.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// The backend did not answer within the fetch budget.
    #[error("Backend timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The backend rejected the query shape or its parameters.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A returned record could not be decoded.
    #[error("Failed to decode record: {0}")]
    Decode(String),

    /// A graph snapshot could not be loaded.
    #[error("Invalid snapshot at {}: {message}", path.display())]
    Snapshot { path: PathBuf, message: String },
}

impl BackendError {
    /// Transport-level failures; worth one more attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, BackendError::Unavailable(_) | BackendError::Timeout(_))
    }
}

impl From<surrealdb::Error> for BackendError {
    fn from(err: surrealdb::Error) -> Self {
        match err {
            // Statement-level errors (parse, field, type) are query defects
            surrealdb::Error::Db(_) => BackendError::InvalidQuery(err.to_string()),
            _ => BackendError::Unavailable(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}
