//! Turns a classified intent into the fetches that answer it.

use serde_json::Value;

use super::classifier::Intent;
use crate::graph::{param, Params, QueryKind};

/// One backend fetch: a template kind with its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetch {
    pub kind: QueryKind,
    pub params: Params,
}

impl Fetch {
    fn new(kind: QueryKind, params: Params) -> Self {
        Self { kind, params }
    }
}

/// The fetches for one intent.
///
/// Fetches are independent of each other and may run concurrently.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    fetches: Vec<Fetch>,
    /// Maximum rows kept for ranking intents.
    limit: Option<usize>,
}

impl QueryPlan {
    pub fn fetches(&self) -> &[Fetch] {
        &self.fetches
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn is_empty(&self) -> bool {
        self.fetches.is_empty()
    }
}

/// Builds plans from intents.
#[derive(Debug, Clone)]
pub struct QueryPlanner {
    frequency_limit: usize,
}

impl QueryPlanner {
    pub fn new(frequency_limit: usize) -> Self {
        Self {
            frequency_limit: frequency_limit.max(1),
        }
    }

    /// Plan an intent. `Unrecognized` yields an empty plan.
    pub fn plan(&self, intent: &Intent) -> QueryPlan {
        match intent {
            Intent::ErrorDiagnosis {
                error_code,
                product_sku,
            } => {
                let mut fetches = vec![Fetch::new(
                    QueryKind::ErrorDetails,
                    Params::new().bind(param::ERROR_CODE, error_code.as_str()),
                )];
                if let Some(sku) = product_sku {
                    fetches.push(Fetch::new(
                        QueryKind::ProductAffinity,
                        Params::new()
                            .bind(param::ERROR_CODE, error_code.as_str())
                            .bind(param::PRODUCT_SKU, sku.as_str()),
                    ));
                }
                QueryPlan {
                    fetches,
                    limit: None,
                }
            }
            Intent::CompatibilityLookup { product_sku } => QueryPlan {
                fetches: vec![Fetch::new(
                    QueryKind::CompatibleProducts,
                    Params::new().bind(param::PRODUCT_SKU, product_sku.as_str()),
                )],
                limit: None,
            },
            Intent::SpecLookup { term } => QueryPlan {
                fetches: vec![Fetch::new(
                    QueryKind::CableSpecs,
                    Params::new().bind(param::TERM, optional(term)),
                )],
                limit: None,
            },
            Intent::FrequencyRanking { limit } => {
                let limit = limit
                    .unwrap_or(self.frequency_limit)
                    .clamp(1, self.frequency_limit);
                QueryPlan {
                    fetches: vec![Fetch::new(
                        QueryKind::FrequencyRanking,
                        Params::new().bind(param::LIMIT, limit as u64),
                    )],
                    limit: Some(limit),
                }
            }
            Intent::InstallerLookup { region } => QueryPlan {
                fetches: vec![Fetch::new(
                    QueryKind::CertifiedInstallers,
                    Params::new().bind(param::REGION, optional(region)),
                )],
                limit: None,
            },
            Intent::Unrecognized => QueryPlan {
                fetches: Vec::new(),
                limit: None,
            },
        }
    }
}

fn optional(value: &Option<String>) -> Value {
    value.as_deref().map(Value::from).unwrap_or(Value::Null)
}
