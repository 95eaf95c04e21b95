//! Engine error types.

use std::time::Duration;

use thiserror::Error;

use super::result::FailureKind;
use crate::config::ConfigError;
use crate::graph::{BackendError, QueryKind};
use crate::query::TemplateError;

/// Errors raised while building the engine or executing a plan.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Transport failure after the bounded retry.
    #[error("Graph backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The overall query budget ran out; in-flight fetches were cancelled.
    #[error("Query timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// A query shape or record the engine built or expected was wrong.
    #[error("Internal query error in {kind}: {message}")]
    InternalQuery { kind: QueryKind, message: String },

    #[error("Invalid query template: {0}")]
    Template(#[from] TemplateError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EngineError {
    pub fn internal(kind: QueryKind, message: impl Into<String>) -> Self {
        EngineError::InternalQuery {
            kind,
            message: message.into(),
        }
    }

    /// Taxonomy bucket reported to callers.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            EngineError::BackendUnavailable(_) | EngineError::Timeout(_) => {
                FailureKind::BackendUnavailable
            }
            EngineError::InternalQuery { .. }
            | EngineError::Template(_)
            | EngineError::Config(_) => FailureKind::InternalQueryError,
        }
    }
}

impl From<BackendError> for EngineError {
    fn from(err: BackendError) -> Self {
        EngineError::BackendUnavailable(err.to_string())
    }
}
