//! The diagnostic query engine.
//!
//! [`Engine::process_query`] is the single entry point: it classifies the
//! input, plans and executes the fetches, and assembles a
//! [`DiagnosticResult`]. It never returns an error; every failure is folded
//! into the result with a [`FailureKind`].
//!
//! The engine holds no per-request state. The backend pool is the only
//! resource shared between concurrent queries.

mod assembler;
mod error;
mod lifecycle;
mod result;

pub use assembler::{ResponseAssembler, UNRECOGNIZED_REASON};
pub use error::EngineError;
pub use lifecycle::{RequestLifecycle, RequestState};
pub use result::{
    CableSpecs, CertifiedInstaller, Compatibility, DiagnosticResult, ErrorDiagnosis, FailureKind,
    FrequencyEntry, FrequencyRanking, Installers, Payload, ProductContext,
};

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, field, info, info_span, Instrument, Span};
use uuid::Uuid;

use crate::config::{BackendKind, Config, ConfigError};
use crate::graph::{BackendPool, GraphBackend, GraphStats, MemoryBackend, SurrealBackend};
use crate::query::{
    ExecutionPolicy, Intent, QueryClassifier, QueryExecutor, QueryInput, QueryPlanner,
    QueryTemplates,
};

/// Classifier, planner, executor and assembler over one backend pool.
pub struct Engine {
    classifier: QueryClassifier,
    planner: QueryPlanner,
    executor: QueryExecutor,
    assembler: ResponseAssembler,
    pool: BackendPool,
}

impl Engine {
    /// Build an engine over an already connected backend.
    ///
    /// Query templates and classifier rules are validated here, so a broken
    /// configuration fails at startup instead of on the first query.
    pub fn new(backend: Arc<dyn GraphBackend>, config: &Config) -> Result<Self, EngineError> {
        config.validate()?;

        let templates = Arc::new(QueryTemplates::standard()?);
        let pool = BackendPool::new(backend, config.backend.pool_size);
        let executor = QueryExecutor::new(
            pool.clone(),
            templates,
            ExecutionPolicy::from(&config.engine),
        );

        Ok(Self {
            classifier: QueryClassifier::new(&config.classifier)?,
            planner: QueryPlanner::new(config.engine.frequency_limit),
            executor,
            assembler: ResponseAssembler::new(),
            pool,
        })
    }

    /// Connect the configured backend and build an engine over it.
    pub async fn from_config(config: &Config) -> Result<Self, EngineError> {
        let backend: Arc<dyn GraphBackend> = match config.backend.kind {
            BackendKind::Surreal => Arc::new(SurrealBackend::connect(&config.backend).await?),
            BackendKind::Memory => {
                let path = config.backend.snapshot.as_deref().ok_or_else(|| {
                    ConfigError::Invalid("memory backend requires backend.snapshot".to_string())
                })?;
                Arc::new(MemoryBackend::from_yaml_file(path)?)
            }
        };

        info!(backend = backend.name(), "Graph backend ready");
        Self::new(backend, config)
    }

    /// Answer one query.
    pub async fn process_query(&self, input: impl Into<QueryInput>) -> DiagnosticResult {
        let input = input.into();
        let span = info_span!("query", request_id = %Uuid::new_v4(), intent = field::Empty);
        self.run(input).instrument(span).await
    }

    async fn run(&self, input: QueryInput) -> DiagnosticResult {
        let started = Instant::now();
        let mut lifecycle = RequestLifecycle::new();

        let intent = self.classifier.classify(&input);
        Span::current().record("intent", field::display(intent.kind()));

        if intent == Intent::Unrecognized {
            lifecycle.advance(RequestState::Failed);
            debug!("Query not recognized");
            return self.assembler.unrecognized(started.elapsed());
        }
        lifecycle.advance(RequestState::Classified);

        let plan = self.planner.plan(&intent);
        lifecycle.advance(RequestState::Executing);

        let result = match self.executor.execute(&plan).await {
            Ok(rows) => self.assembler.assemble(&intent, &plan, &rows, started.elapsed()),
            Err(err) => self.assembler.failure(&intent, &err, started.elapsed()),
        };

        lifecycle.advance(if result.success {
            RequestState::Assembled
        } else {
            RequestState::Failed
        });
        info!(
            success = result.success,
            failure = result.failure_kind.map(|k| k.as_str()),
            elapsed_ms = result.response_time_ms,
            "Query processed"
        );

        result
    }

    /// Verify the backend answers a trivial query within the fetch budget.
    pub async fn health(&self) -> Result<(), EngineError> {
        let budget = self.executor.policy().fetch_timeout;
        tokio::time::timeout(budget, self.pool.backend().ping())
            .await
            .map_err(|_| EngineError::Timeout(budget))??;
        Ok(())
    }

    /// Node and relationship counts.
    pub async fn stats(&self) -> Result<GraphStats, EngineError> {
        let budget = self.executor.policy().query_timeout;
        let stats = tokio::time::timeout(budget, self.pool.backend().stats())
            .await
            .map_err(|_| EngineError::Timeout(budget))??;
        Ok(stats)
    }

    pub fn classifier(&self) -> &QueryClassifier {
        &self.classifier
    }

    pub fn backend_name(&self) -> &str {
        self.pool.backend().name()
    }

    /// Stop accepting new fetches. In-flight queries finish.
    pub fn shutdown(&self) {
        self.pool.close();
    }
}
