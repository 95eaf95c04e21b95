mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{memory_backend, SlowBackend};
use techgraph_core::graph::{BackendPool, GraphBackend, QueryKind};
use techgraph_core::query::{
    ExecutionPolicy, Intent, QueryExecutor, QueryPlanner, QueryTemplates,
};
use techgraph_core::EngineError;

fn policy(query_ms: u64, fetch_ms: u64) -> ExecutionPolicy {
    ExecutionPolicy {
        query_timeout: Duration::from_millis(query_ms),
        fetch_timeout: Duration::from_millis(fetch_ms),
        retry_backoff: Duration::from_millis(5),
        max_retries: 1,
    }
}

fn executor(backend: Arc<dyn GraphBackend>, pool_size: usize, policy: ExecutionPolicy) -> (QueryExecutor, BackendPool) {
    let pool = BackendPool::new(backend, pool_size);
    let templates = Arc::new(QueryTemplates::standard().unwrap());
    (QueryExecutor::new(pool.clone(), templates, policy), pool)
}

#[tokio::test]
async fn test_fetches_run_and_release_sessions() {
    let (executor, pool) = executor(Arc::new(memory_backend()), 2, policy(1_000, 500));
    let plan = QueryPlanner::new(10).plan(&Intent::ErrorDiagnosis {
        error_code: "E458".to_string(),
        product_sku: Some("AM080MXVAF".to_string()),
    });

    let rows = executor.execute(&plan).await.unwrap();

    assert_eq!(rows.results().len(), 2);
    assert_eq!(rows.records(QueryKind::ErrorDetails).unwrap().len(), 1);
    assert_eq!(rows.records(QueryKind::ProductAffinity).unwrap().len(), 1);
    assert_eq!(pool.available(), 2);
}

#[tokio::test]
async fn test_sub_fetches_run_concurrently() {
    let backend = Arc::new(SlowBackend::new(Duration::from_millis(150)));
    let (executor, _) = executor(backend, 2, policy(1_000, 500));
    let plan = QueryPlanner::new(10).plan(&Intent::ErrorDiagnosis {
        error_code: "E458".to_string(),
        product_sku: Some("AM080MXVAF".to_string()),
    });

    let started = std::time::Instant::now();
    executor.execute(&plan).await.unwrap();

    // Sequential execution would take at least 300ms
    assert!(started.elapsed() < Duration::from_millis(290));
}

#[tokio::test]
async fn test_timeout_discards_partial_results_and_releases_sessions() {
    let backend = Arc::new(SlowBackend::new(Duration::from_millis(400)));
    let (executor, pool) = executor(backend, 4, policy(80, 1_000));
    let plan = QueryPlanner::new(10).plan(&Intent::ErrorDiagnosis {
        error_code: "E458".to_string(),
        product_sku: Some("AM080MXVAF".to_string()),
    });

    let err = executor.execute(&plan).await.unwrap_err();

    assert!(matches!(err, EngineError::Timeout(_)));
    assert_eq!(pool.available(), 4);
}

#[tokio::test]
async fn test_retries_are_clamped_to_one() {
    let backend = Arc::new(SlowBackend::new(Duration::from_millis(200)));
    let mut policy = policy(2_000, 20);
    policy.max_retries = 7;
    let (executor, _) = executor(backend.clone(), 1, policy);
    assert_eq!(executor.policy().max_retries, 1);

    let plan = QueryPlanner::new(10).plan(&Intent::SpecLookup { term: None });
    let err = executor.execute(&plan).await.unwrap_err();

    assert!(matches!(err, EngineError::BackendUnavailable(_)));
    assert_eq!(backend.attempts(), 2);
}

#[tokio::test]
async fn test_closed_pool_reports_unavailable() {
    let (executor, pool) = executor(Arc::new(memory_backend()), 1, policy(1_000, 100));
    pool.close();

    let plan = QueryPlanner::new(10).plan(&Intent::FrequencyRanking { limit: None });
    let err = executor.execute(&plan).await.unwrap_err();
    assert!(matches!(err, EngineError::BackendUnavailable(_)));
}
