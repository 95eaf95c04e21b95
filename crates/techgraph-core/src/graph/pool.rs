//! Bounded session pool over a shared backend.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::error::BackendError;
use super::pattern::PatternQuery;
use super::record::{Params, Record};
use super::GraphBackend;

/// Shared handle to a backend with at most `size` sessions in flight.
///
/// Cloning is cheap; clones share the same permits.
#[derive(Clone)]
pub struct BackendPool {
    backend: Arc<dyn GraphBackend>,
    permits: Arc<Semaphore>,
    size: usize,
}

impl BackendPool {
    pub fn new(backend: Arc<dyn GraphBackend>, size: usize) -> Self {
        let size = size.max(1);
        Self {
            backend,
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Wait for a free session. The session is returned to the pool when
    /// dropped, whether the fetch succeeded, failed or was cancelled.
    pub async fn acquire(&self) -> Result<Session, BackendError> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| BackendError::Unavailable("session pool closed".to_string()))?;

        Ok(Session {
            backend: Arc::clone(&self.backend),
            _permit: permit,
        })
    }

    /// Stop handing out sessions. In-flight sessions finish normally.
    pub fn close(&self) {
        self.permits.close();
    }

    pub fn backend(&self) -> &Arc<dyn GraphBackend> {
        &self.backend
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Sessions currently free.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

/// A scoped session on the pooled backend.
pub struct Session {
    backend: Arc<dyn GraphBackend>,
    _permit: OwnedSemaphorePermit,
}

impl Session {
    pub async fn execute(
        &self,
        query: &PatternQuery,
        params: &Params,
    ) -> Result<Vec<Record>, BackendError> {
        self.backend.execute(query, params).await
    }
}
