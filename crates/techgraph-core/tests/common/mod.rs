//! Shared fixtures and instrumented backends for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use techgraph_core::graph::{
    BackendError, GraphBackend, GraphSnapshot, GraphStats, MemoryBackend, Params, PatternQuery,
    Record, ResultOrder,
};
use techgraph_core::{Config, Engine};

pub const SAMPLE_GRAPH: &str = include_str!("../../fixtures/sample_graph.yaml");

pub fn snapshot() -> GraphSnapshot {
    GraphSnapshot::from_yaml_str(SAMPLE_GRAPH).unwrap()
}

pub fn memory_backend() -> MemoryBackend {
    MemoryBackend::new(snapshot())
}

/// Engine over `backend` with default configuration adjusted by `tweak`.
pub fn engine_with(backend: Arc<dyn GraphBackend>, tweak: impl FnOnce(&mut Config)) -> Engine {
    let mut config = Config::default();
    tweak(&mut config);
    Engine::new(backend, &config).unwrap()
}

pub fn engine() -> Engine {
    engine_with(Arc::new(memory_backend()), |_| {})
}

/// Short budgets so failure tests finish quickly.
pub fn fast_budgets(config: &mut Config) {
    config.engine.fetch_timeout_ms = 50;
    config.engine.query_timeout_ms = 1_000;
    config.engine.retry_backoff_ms = 5;
}

/// Counts calls to `execute` and delegates to the sample graph.
pub struct CountingBackend {
    inner: MemoryBackend,
    calls: AtomicUsize,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self {
            inner: memory_backend(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphBackend for CountingBackend {
    fn name(&self) -> &str {
        "counting"
    }

    async fn execute(
        &self,
        query: &PatternQuery,
        params: &Params,
    ) -> Result<Vec<Record>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.execute(query, params).await
    }

    async fn ping(&self) -> Result<(), BackendError> {
        self.inner.ping().await
    }

    async fn stats(&self) -> Result<GraphStats, BackendError> {
        self.inner.stats().await
    }
}

/// Fails the first `failures` calls with the given error, then delegates.
pub struct ScriptedBackend {
    inner: MemoryBackend,
    failures: usize,
    error: fn() -> BackendError,
    attempts: AtomicUsize,
}

impl ScriptedBackend {
    pub fn failing(failures: usize, error: fn() -> BackendError) -> Self {
        Self {
            inner: memory_backend(),
            failures,
            error,
            attempts: AtomicUsize::new(0),
        }
    }

    /// Never succeeds.
    pub fn down() -> Self {
        Self::failing(usize::MAX, || {
            BackendError::Unavailable("connection refused".to_string())
        })
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn execute(
        &self,
        query: &PatternQuery,
        params: &Params,
    ) -> Result<Vec<Record>, BackendError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err((self.error)());
        }
        self.inner.execute(query, params).await
    }

    async fn ping(&self) -> Result<(), BackendError> {
        Err((self.error)())
    }

    async fn stats(&self) -> Result<GraphStats, BackendError> {
        Err((self.error)())
    }
}

/// Sleeps before every call, simulating a backend that hangs.
pub struct SlowBackend {
    inner: MemoryBackend,
    delay: Duration,
    attempts: AtomicUsize,
}

impl SlowBackend {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: memory_backend(),
            delay,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphBackend for SlowBackend {
    fn name(&self) -> &str {
        "slow"
    }

    async fn execute(
        &self,
        query: &PatternQuery,
        params: &Params,
    ) -> Result<Vec<Record>, BackendError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.inner.execute(query, params).await
    }

    async fn ping(&self) -> Result<(), BackendError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    async fn stats(&self) -> Result<GraphStats, BackendError> {
        self.inner.stats().await
    }
}

/// Returns rows in reverse and declares its order unspecified.
pub struct UnorderedBackend {
    inner: MemoryBackend,
}

impl UnorderedBackend {
    pub fn new() -> Self {
        Self {
            inner: memory_backend(),
        }
    }
}

#[async_trait]
impl GraphBackend for UnorderedBackend {
    fn name(&self) -> &str {
        "unordered"
    }

    async fn execute(
        &self,
        query: &PatternQuery,
        params: &Params,
    ) -> Result<Vec<Record>, BackendError> {
        let mut rows = self.inner.execute(query, params).await?;
        rows.reverse();
        Ok(rows)
    }

    async fn ping(&self) -> Result<(), BackendError> {
        Ok(())
    }

    async fn stats(&self) -> Result<GraphStats, BackendError> {
        self.inner.stats().await
    }

    fn result_order(&self) -> ResultOrder {
        ResultOrder::Unspecified
    }
}
