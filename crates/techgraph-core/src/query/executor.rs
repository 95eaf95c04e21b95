//! Runs query plans against the pooled backend.
//!
//! Fetches of one plan run concurrently, each on its own pooled session and
//! under its own timeout. A transport failure is retried once after a short
//! backoff; a query defect is never retried. The whole plan is bounded by
//! the query budget: when it expires, every in-flight fetch is dropped and
//! nothing from the plan is kept.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use tracing::{debug, warn};

use super::planner::{Fetch, QueryPlan};
use super::templates::QueryTemplates;
use crate::config::EngineConfig;
use crate::engine::EngineError;
use crate::graph::{
    BackendError, BackendPool, Params, PatternQuery, QueryKind, Record, ResultOrder,
};

/// Time budgets and retry policy.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionPolicy {
    pub query_timeout: Duration,
    pub fetch_timeout: Duration,
    pub retry_backoff: Duration,
    /// 0 or 1.
    pub max_retries: u32,
}

impl From<&EngineConfig> for ExecutionPolicy {
    fn from(config: &EngineConfig) -> Self {
        Self {
            query_timeout: config.query_timeout(),
            fetch_timeout: config.fetch_timeout(),
            retry_backoff: config.retry_backoff(),
            max_retries: config.retries(),
        }
    }
}

/// Rows returned for one fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    pub kind: QueryKind,
    pub records: Vec<Record>,
}

/// Rows for every fetch of a plan, in plan order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanResult {
    results: Vec<FetchResult>,
}

impl PlanResult {
    pub fn from_results(results: impl IntoIterator<Item = (QueryKind, Vec<Record>)>) -> Self {
        Self {
            results: results
                .into_iter()
                .map(|(kind, records)| FetchResult { kind, records })
                .collect(),
        }
    }

    /// Rows of the first fetch of the given kind.
    pub fn records(&self, kind: QueryKind) -> Option<&[Record]> {
        self.results
            .iter()
            .find(|r| r.kind == kind)
            .map(|r| r.records.as_slice())
    }

    pub fn results(&self) -> &[FetchResult] {
        &self.results
    }
}

/// Executes plans through a [`BackendPool`].
pub struct QueryExecutor {
    pool: BackendPool,
    templates: Arc<QueryTemplates>,
    policy: ExecutionPolicy,
}

impl QueryExecutor {
    pub fn new(pool: BackendPool, templates: Arc<QueryTemplates>, policy: ExecutionPolicy) -> Self {
        Self {
            pool,
            templates,
            policy: ExecutionPolicy {
                max_retries: policy.max_retries.min(1),
                ..policy
            },
        }
    }

    pub fn policy(&self) -> &ExecutionPolicy {
        &self.policy
    }

    /// Run every fetch of the plan concurrently and post-process the rows.
    pub async fn execute(&self, plan: &QueryPlan) -> Result<PlanResult, EngineError> {
        let fetches = plan.fetches().iter().map(|fetch| self.fetch(fetch));

        let results = tokio::time::timeout(self.policy.query_timeout, try_join_all(fetches))
            .await
            .map_err(|_| EngineError::Timeout(self.policy.query_timeout))??;

        let order = self.pool.backend().result_order();
        let results = results
            .into_iter()
            .map(|result| post_process(result, order, plan.limit()))
            .collect();

        Ok(PlanResult { results })
    }

    /// One fetch with at most one retry on transport failure.
    async fn fetch(&self, fetch: &Fetch) -> Result<FetchResult, EngineError> {
        let template = self.templates.get(fetch.kind)?;
        check_bindings(fetch, template.params())?;

        let mut attempt = 0;
        loop {
            match self.fetch_once(template, &fetch.params).await {
                Ok(records) => {
                    debug!(kind = %fetch.kind, rows = records.len(), attempt, "Fetch complete");
                    return Ok(FetchResult {
                        kind: fetch.kind,
                        records,
                    });
                }
                Err(err) if err.is_transient() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    warn!(kind = %fetch.kind, error = %err, "Fetch failed, retrying once");
                    tokio::time::sleep(self.policy.retry_backoff).await;
                }
                Err(err) if err.is_transient() => {
                    return Err(EngineError::BackendUnavailable(err.to_string()));
                }
                Err(err) => return Err(EngineError::internal(fetch.kind, err.to_string())),
            }
        }
    }

    /// One attempt on a pooled session, bounded by the fetch budget.
    async fn fetch_once(
        &self,
        template: &PatternQuery,
        params: &Params,
    ) -> Result<Vec<Record>, BackendError> {
        let run = async {
            let session = self.pool.acquire().await?;
            session.execute(template, params).await
        };

        tokio::time::timeout(self.policy.fetch_timeout, run)
            .await
            .map_err(|_| BackendError::Timeout(self.policy.fetch_timeout))?
    }
}

/// The bound parameters must be exactly the ones the template declares.
fn check_bindings(fetch: &Fetch, declared: &[String]) -> Result<(), EngineError> {
    let bound: BTreeSet<&str> = fetch.params.names().collect();
    let declared: BTreeSet<&str> = declared.iter().map(String::as_str).collect();
    if bound != declared {
        return Err(EngineError::internal(
            fetch.kind,
            format!("bound parameters {bound:?} do not match template parameters {declared:?}"),
        ));
    }
    Ok(())
}

/// Apply each kind's ordering (only when the backend does not guarantee
/// it), drop unobserved frequencies and truncate rankings.
fn post_process(mut result: FetchResult, order: ResultOrder, limit: Option<usize>) -> FetchResult {
    if order == ResultOrder::Unspecified {
        match result.kind {
            QueryKind::CompatibleProducts => {
                result
                    .records
                    .sort_by(|a, b| cmp_f64(a.f64_field("capacidadKw"), b.f64_field("capacidadKw")));
            }
            QueryKind::CableSpecs => {
                result
                    .records
                    .sort_by(|a, b| a.str_field("tipo").cmp(&b.str_field("tipo")));
            }
            QueryKind::FrequencyRanking => {
                result
                    .records
                    .sort_by(|a, b| b.u64_field("frecuencia").cmp(&a.u64_field("frecuencia")));
            }
            QueryKind::CertifiedInstallers => {
                result
                    .records
                    .sort_by(|a, b| a.str_field("region").cmp(&b.str_field("region")));
            }
            QueryKind::ErrorDetails | QueryKind::ProductAffinity => {}
        }
    }

    if result.kind == QueryKind::FrequencyRanking {
        result
            .records
            .retain(|r| r.u64_field("frecuencia").is_some_and(|f| f > 0));
        if let Some(limit) = limit {
            result.records.truncate(limit);
        }
    }

    result
}

fn cmp_f64(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ranking(frequencies: &[Option<u64>]) -> FetchResult {
        FetchResult {
            kind: QueryKind::FrequencyRanking,
            records: frequencies
                .iter()
                .map(|f| Record::new().with("frecuencia", json!(f)))
                .collect(),
        }
    }

    #[test]
    fn test_unspecified_order_is_sorted() {
        let result = post_process(
            ranking(&[Some(2), Some(9), Some(5)]),
            ResultOrder::Unspecified,
            Some(10),
        );
        let freqs: Vec<u64> = result
            .records
            .iter()
            .filter_map(|r| r.u64_field("frecuencia"))
            .collect();
        assert_eq!(freqs, vec![9, 5, 2]);
    }

    #[test]
    fn test_preserved_order_is_not_resorted() {
        let records = vec![
            Record::new().with("capacidadKw", 7.1),
            Record::new().with("capacidadKw", 2.2),
        ];
        let result = post_process(
            FetchResult {
                kind: QueryKind::CompatibleProducts,
                records: records.clone(),
            },
            ResultOrder::Preserved,
            None,
        );
        assert_eq!(result.records, records);
    }

    #[test]
    fn test_ranking_drops_unobserved_and_truncates() {
        let result = post_process(
            ranking(&[Some(8), Some(0), None, Some(3), Some(1)]),
            ResultOrder::Preserved,
            Some(2),
        );
        let freqs: Vec<u64> = result
            .records
            .iter()
            .filter_map(|r| r.u64_field("frecuencia"))
            .collect();
        assert_eq!(freqs, vec![8, 3]);
    }
}
